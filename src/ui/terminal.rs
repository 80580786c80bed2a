//! Line-oriented terminal front end
//!
//! Shows the preference form until a story starts, then the story reader.
//! Input is not read while a turn is in flight, which keeps every control
//! disabled during loading.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use super::form::{StoryForm, FORM_HEADING, FORM_INTRO};
use super::view::{
    Action, ReaderFooter, Screen, View, CHOICE_PROMPT, END_MARKER, FOOTER, NEW_STORY_LABEL,
    RETRY_LABEL, TAGLINE, TITLE,
};
use crate::session::{SessionController, StoryError};
use crate::story::PreferenceField;

const SPINNER_INTERVAL: Duration = Duration::from_millis(400);

pub struct TerminalApp<R, W> {
    controller: Arc<SessionController>,
    input: Lines<R>,
    out: W,
    /// Paragraphs already printed for the current story
    shown: usize,
}

impl<R, W> TerminalApp<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(controller: Arc<SessionController>, input: R, out: W) -> Self {
        Self {
            controller,
            input: input.lines(),
            out,
            shown: 0,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until input is exhausted
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.out, "{}\n{}\n", TITLE, TAGLINE)?;

        loop {
            let view = View::from_state(&self.controller.snapshot());
            if let Some(banner) = &view.banner {
                writeln!(self.out, "\n[!] {}", banner.message)?;
            }

            let keep_going = match view.screen.clone() {
                Screen::Form { .. } => self.form_step(&view).await?,
                Screen::Reader { paragraphs, footer } => {
                    self.reader_step(&view, &paragraphs, &footer).await?
                }
            };
            if !keep_going {
                break;
            }
        }

        writeln!(self.out, "\n{}", FOOTER)?;
        self.out.flush()?;
        Ok(())
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        self.out.flush()?;
        Ok(self.input.next_line().await?)
    }

    async fn form_step(&mut self, view: &View) -> Result<bool> {
        if view.banner.is_some() {
            write!(self.out, "r = {}, Enter = tiếp tục: ", RETRY_LABEL)?;
            let Some(line) = self.read_line().await? else {
                return Ok(false);
            };
            if line.trim().eq_ignore_ascii_case("r") {
                self.controller.reset();
                return Ok(true);
            }
        }

        let Some(form) = self.fill_form().await? else {
            return Ok(false);
        };

        writeln!(self.out, "\n{}", StoryForm::submit_label(true))?;
        self.shown = 0;
        let controller = self.controller.clone();
        let prefs = form.into_preferences();
        self.run_turn(async move { controller.start_story(&prefs).await })
            .await?;
        Ok(true)
    }

    async fn fill_form(&mut self) -> Result<Option<StoryForm>> {
        writeln!(self.out, "{}\n{}\n", FORM_HEADING, FORM_INTRO)?;

        let mut form = StoryForm::new();
        for field in PreferenceField::ALL {
            loop {
                write!(self.out, "{}", form.field_prompt(field))?;
                let Some(line) = self.read_line().await? else {
                    return Ok(None);
                };
                match form.with_input(field, &line) {
                    Ok(next) => {
                        form = next;
                        break;
                    }
                    Err(e) => writeln!(self.out, "{}", e)?,
                }
            }
        }

        write!(self.out, "{} [Enter]", StoryForm::submit_label(false))?;
        if self.read_line().await?.is_none() {
            return Ok(None);
        }
        Ok(Some(form))
    }

    async fn reader_step(
        &mut self,
        view: &View,
        paragraphs: &[String],
        footer: &ReaderFooter,
    ) -> Result<bool> {
        if paragraphs.len() < self.shown {
            self.shown = 0;
        }
        for paragraph in &paragraphs[self.shown..] {
            writeln!(self.out, "\n{}", paragraph)?;
        }
        self.shown = paragraphs.len();

        let actions = view.actions();
        match footer {
            ReaderFooter::Choices(choices) => {
                writeln!(self.out, "\n{}", CHOICE_PROMPT)?;
                for (i, choice) in choices.iter().enumerate() {
                    writeln!(self.out, "  {}. {}", i + 1, choice)?;
                }
            }
            ReaderFooter::Finished => {
                writeln!(self.out, "\n{}", END_MARKER)?;
                writeln!(self.out, "Enter = {}", NEW_STORY_LABEL)?;
            }
            ReaderFooter::Loading | ReaderFooter::Empty => {}
        }
        if actions.is_empty() {
            self.controller.reset();
            return Ok(true);
        }
        if view.banner.is_some() {
            writeln!(self.out, "r = {}", RETRY_LABEL)?;
        }

        loop {
            write!(self.out, "> ")?;
            let Some(line) = self.read_line().await? else {
                return Ok(false);
            };
            match parse_action(&actions, &line) {
                Some(Action::Choose(choice)) => {
                    let controller = self.controller.clone();
                    self.run_turn(async move { controller.select_choice(&choice).await })
                        .await?;
                    return Ok(true);
                }
                Some(Action::Reset) => {
                    self.controller.reset();
                    self.shown = 0;
                    writeln!(self.out)?;
                    return Ok(true);
                }
                Some(Action::Submit) | None => {}
            }
        }
    }

    /// Run one turn in the background, ticking a progress indicator until it ends
    async fn run_turn<F>(&mut self, turn: F) -> Result<()>
    where
        F: Future<Output = Result<(), StoryError>> + Send + 'static,
    {
        let mut handle = tokio::spawn(turn);
        let mut ticker = tokio::time::interval(SPINNER_INTERVAL);

        loop {
            tokio::select! {
                joined = &mut handle => {
                    writeln!(self.out)?;
                    if let Err(e) = joined? {
                        debug!("Turn ended with error: {}", e);
                    }
                    return Ok(());
                }
                _ = ticker.tick() => {
                    write!(self.out, ".")?;
                    self.out.flush()?;
                }
            }
        }
    }
}

/// Map a typed line onto one of the enabled actions
pub fn parse_action(actions: &[Action], input: &str) -> Option<Action> {
    let input = input.trim();

    let only_reset = actions.len() == 1 && actions[0] == Action::Reset;
    if input.eq_ignore_ascii_case("r") || (input.is_empty() && only_reset) {
        return actions.iter().find(|a| **a == Action::Reset).cloned();
    }

    let index = input.parse::<usize>().ok()?.checked_sub(1)?;
    actions
        .iter()
        .filter(|a| matches!(a, Action::Choose(_)))
        .nth(index)
        .cloned()
}
