//! Session controller for one interactive story
//!
//! Owns the conversation state and the chat handle, and drives the turn
//! protocol: start a story, continue it with a chosen option, or reset.
//! At most one turn is in flight at a time; a second call while busy is
//! rejected without touching state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use super::error::{Operation, StoryError};
use super::state::SessionState;
use crate::config::StoryConfig;
use crate::llm::{ChatConnector, ChatSession};
use crate::story::{parse_story_response, prompt, StoryPreferences, StoryResponse};

struct Inner {
    state: SessionState,
    /// Bumped on every new story and every reset; stale turns are discarded
    generation: u64,
}

pub struct SessionController {
    connector: Arc<dyn ChatConnector>,
    api_key: Option<String>,
    model: String,
    inner: Mutex<Inner>,
    chat: Mutex<Option<Box<dyn ChatSession>>>,
    busy: AtomicBool,
}

/// Holds the single-flight flag; clears `busy` and `loading` however the turn ends
struct TurnGuard<'a> {
    controller: &'a SessionController,
}

impl<'a> TurnGuard<'a> {
    fn acquire(controller: &'a SessionController) -> Result<Self, StoryError> {
        controller
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StoryError::Busy)?;
        Ok(Self { controller })
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.controller.lock_inner().state.loading = false;
        self.controller.busy.store(false, Ordering::Release);
    }
}

/// A chat handle taken out of its slot for one continuation
///
/// Dropping the lease puts the handle back unless the conversation was reset
/// or replaced in the meantime, so a cancelled turn keeps the story going.
struct ChatLease<'a> {
    controller: &'a SessionController,
    chat: Option<Box<dyn ChatSession>>,
    generation: u64,
}

impl ChatLease<'_> {
    fn chat_mut(&mut self) -> Option<&mut (dyn ChatSession + 'static)> {
        self.chat.as_deref_mut()
    }
}

impl Drop for ChatLease<'_> {
    fn drop(&mut self) {
        let Some(chat) = self.chat.take() else {
            return;
        };
        let inner = self.controller.lock_inner();
        if inner.generation == self.generation {
            *self.controller.lock_chat() = Some(chat);
        } else {
            debug!("Dropping chat session of a conversation that was reset");
        }
    }
}

impl SessionController {
    pub fn new(connector: Arc<dyn ChatConnector>, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            connector,
            api_key,
            model: model.into(),
            inner: Mutex::new(Inner {
                state: SessionState::default(),
                generation: 0,
            }),
            chat: Mutex::new(None),
            busy: AtomicBool::new(false),
        }
    }

    pub fn from_config(connector: Arc<dyn ChatConnector>, config: &StoryConfig) -> Self {
        Self::new(connector, config.api_key.clone(), config.model.clone())
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_chat(&self) -> MutexGuard<'_, Option<Box<dyn ChatSession>>> {
        self.chat.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> SessionState {
        self.lock_inner().state.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_inner().state.loading
    }

    pub fn has_chat(&self) -> bool {
        self.lock_chat().is_some()
    }

    /// Begin a new story from the reader's preferences
    ///
    /// Any previous conversation is dropped first. Failures are recorded in
    /// the state's `error` and also returned.
    pub async fn start_story(&self, prefs: &StoryPreferences) -> Result<(), StoryError> {
        let _turn = TurnGuard::acquire(self)?;

        let generation = {
            let mut inner = self.lock_inner();
            inner.generation += 1;
            inner.state = SessionState {
                loading: true,
                ..SessionState::default()
            };
            inner.generation
        };
        self.lock_chat().take();

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Refusing to start story: no API key configured");
            let err = StoryError::Configuration;
            self.lock_inner().state.error = Some(err.user_message(Operation::Start).to_string());
            return Err(err);
        };

        info!(
            provider = self.connector.name(),
            model = %self.model,
            topic = %prefs.topic,
            reading_level = %prefs.reading_level,
            "Starting new story"
        );

        let mut chat = self
            .connector
            .create_chat(api_key, prompt::chat_config(&self.model));
        let result = request_turn(chat.as_mut(), &prompt::initial_prompt(prefs)).await;

        let mut inner = self.lock_inner();
        if inner.generation != generation {
            debug!("Discarding opening turn of a conversation that was reset");
            return Ok(());
        }

        match result {
            Ok(response) => {
                debug!(choices = response.choices.len(), "Story started");
                inner.state.segments = vec![response.story_part];
                inner.state.choices = response.choices;
                inner.state.started = true;
                *self.lock_chat() = Some(chat);
                Ok(())
            }
            Err(err) => {
                error!("Failed to start story: {}", err);
                inner.state.error = Some(err.user_message(Operation::Start).to_string());
                Err(err)
            }
        }
    }

    /// Continue the story with the option the reader picked
    ///
    /// Without an active chat this is a silent no-op.
    pub async fn select_choice(&self, choice: &str) -> Result<(), StoryError> {
        let _turn = TurnGuard::acquire(self)?;

        let mut lease = {
            let mut inner = self.lock_inner();
            let chat = self.lock_chat().take();
            let Some(chat) = chat else {
                debug!("Ignoring choice with no active story");
                return Ok(());
            };
            inner.state.loading = true;
            inner.state.error = None;
            ChatLease {
                controller: self,
                chat: Some(chat),
                generation: inner.generation,
            }
        };

        info!(choice = %choice, "Continuing story");
        let result = match lease.chat_mut() {
            Some(chat) => request_turn(chat, &prompt::continuation_prompt(choice)).await,
            None => return Ok(()),
        };

        // `inner` is declared after `lease`, so it is released before the
        // lease hands the chat back
        let mut inner = self.lock_inner();
        if inner.generation != lease.generation {
            debug!("Discarding turn of a conversation that was reset");
            return Ok(());
        }

        match result {
            Ok(response) => {
                if response.is_ending() {
                    info!(segments = inner.state.segments.len() + 1, "Story finished");
                }
                inner.state.segments.push(response.story_part);
                inner.state.choices = response.choices;
                Ok(())
            }
            Err(err) => {
                error!("Failed to continue story: {}", err);
                inner.state.error = Some(err.user_message(Operation::Continue).to_string());
                Err(err)
            }
        }
    }

    /// Forget the current story and release the chat handle
    pub fn reset(&self) {
        {
            let mut inner = self.lock_inner();
            inner.generation += 1;
            let loading = inner.state.loading;
            inner.state = SessionState {
                loading,
                ..SessionState::default()
            };
        }
        if self.lock_chat().take().is_some() {
            debug!("Released chat session");
        }
    }
}

/// One round-trip: send, then parse and validate the reply
async fn request_turn(chat: &mut dyn ChatSession, message: &str) -> Result<StoryResponse, StoryError> {
    let raw = chat.send_message(message).await?;
    let response = parse_story_response(&raw)?;
    Ok(response)
}
