// src/session/state.rs

/// Observable conversation state, as the presentation layer sees it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub started: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Append-only story text, one entry per turn
    pub segments: Vec<String>,
    /// Zero or two pending options
    pub choices: Vec<String>,
}

impl SessionState {
    /// The story has ended: nothing in flight, text on screen, no options left
    pub fn is_finished(&self) -> bool {
        !self.loading && self.started && !self.segments.is_empty() && self.choices.is_empty()
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}
