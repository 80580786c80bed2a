// src/ui/view.rs
// Derives what the reader sees purely from session state

use crate::session::SessionState;

pub const TITLE: &str = "Thư viện Giấc Mơ 📚✨";
pub const TAGLINE: &str = "Nơi mỗi lựa chọn dệt nên một câu chuyện";
pub const FOOTER: &str = "Được tạo ra với trí tuệ nhân tạo Gemini";

pub const RETRY_LABEL: &str = "Thử lại";
pub const CHOICE_PROMPT: &str = "Bạn sẽ làm gì tiếp theo?";
pub const END_MARKER: &str = "Hết.";
pub const NEW_STORY_LABEL: &str = "Bắt đầu một câu chuyện mới";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub message: String,
}

/// What sits under the story text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderFooter {
    Loading,
    Choices(Vec<String>),
    Finished,
    /// Nothing to show yet
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Form { loading: bool },
    Reader { paragraphs: Vec<String>, footer: ReaderFooter },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub banner: Option<ErrorBanner>,
    pub screen: Screen,
}

/// Something the reader can trigger from the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit,
    Choose(String),
    Reset,
}

impl View {
    pub fn from_state(state: &SessionState) -> Self {
        let banner = state.error.as_ref().map(|message| ErrorBanner {
            message: message.clone(),
        });

        let screen = if !state.started {
            Screen::Form {
                loading: state.loading,
            }
        } else {
            let footer = if state.loading {
                ReaderFooter::Loading
            } else if state.has_choices() {
                ReaderFooter::Choices(state.choices.clone())
            } else if !state.segments.is_empty() {
                ReaderFooter::Finished
            } else {
                ReaderFooter::Empty
            };
            Screen::Reader {
                paragraphs: state.segments.clone(),
                footer,
            }
        };

        Self { banner, screen }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.screen,
            Screen::Form { loading: true }
                | Screen::Reader {
                    footer: ReaderFooter::Loading,
                    ..
                }
        )
    }

    /// Controls that are enabled right now, in display order
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        match &self.screen {
            Screen::Form { loading } => {
                if !loading {
                    actions.push(Action::Submit);
                }
            }
            Screen::Reader { footer, .. } => match footer {
                ReaderFooter::Choices(choices) => {
                    actions.extend(choices.iter().cloned().map(Action::Choose));
                }
                ReaderFooter::Finished => actions.push(Action::Reset),
                ReaderFooter::Loading | ReaderFooter::Empty => {}
            },
        }
        if self.banner.is_some() && !actions.contains(&Action::Reset) {
            actions.push(Action::Reset);
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_state(segments: &[&str], choices: &[&str]) -> SessionState {
        SessionState {
            started: true,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            choices: choices.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_form_until_started() {
        let view = View::from_state(&SessionState::default());
        assert_eq!(view.screen, Screen::Form { loading: false });
        assert_eq!(view.actions(), vec![Action::Submit]);
        assert!(view.banner.is_none());
    }

    #[test]
    fn test_form_submit_blocked_while_loading() {
        let state = SessionState {
            loading: true,
            ..Default::default()
        };
        let view = View::from_state(&state);
        assert!(view.is_loading());
        assert!(view.actions().is_empty());
    }

    #[test]
    fn test_reader_with_choices() {
        let view = View::from_state(&reader_state(&["one", "two"], &["A", "B"]));
        match &view.screen {
            Screen::Reader { paragraphs, footer } => {
                assert_eq!(paragraphs, &vec!["one".to_string(), "two".to_string()]);
                assert_eq!(footer, &ReaderFooter::Choices(vec!["A".into(), "B".into()]));
            }
            other => panic!("expected reader, got {:?}", other),
        }
        assert_eq!(
            view.actions(),
            vec![Action::Choose("A".into()), Action::Choose("B".into())]
        );
    }

    #[test]
    fn test_loading_hides_choices() {
        let mut state = reader_state(&["one"], &["A", "B"]);
        state.loading = true;
        let view = View::from_state(&state);
        assert!(view.is_loading());
        assert!(view.actions().is_empty());
    }

    #[test]
    fn test_finished_offers_reset() {
        let view = View::from_state(&reader_state(&["one", "end."], &[]));
        assert!(matches!(
            view.screen,
            Screen::Reader {
                footer: ReaderFooter::Finished,
                ..
            }
        ));
        assert_eq!(view.actions(), vec![Action::Reset]);
    }

    #[test]
    fn test_error_banner_adds_reset_on_any_screen() {
        let state = SessionState {
            error: Some("boom".into()),
            ..Default::default()
        };
        let view = View::from_state(&state);
        assert_eq!(view.banner, Some(ErrorBanner { message: "boom".into() }));
        assert_eq!(view.actions(), vec![Action::Submit, Action::Reset]);

        let mut state = reader_state(&["one"], &["A", "B"]);
        state.error = Some("boom".into());
        let actions = View::from_state(&state).actions();
        assert_eq!(actions.last(), Some(&Action::Reset));
        assert_eq!(actions.len(), 3);
    }
}
