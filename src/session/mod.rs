// src/session/mod.rs
// Session controller: conversation state and the turn protocol

pub mod controller;
pub mod error;
pub mod state;

pub use controller::SessionController;
pub use error::{Operation, StoryError};
pub use state::SessionState;
