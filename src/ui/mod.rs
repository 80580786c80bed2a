// src/ui/mod.rs
// Presentation layer: preference form and story reader

pub mod form;
pub mod terminal;
pub mod view;

pub use form::{FormError, StoryForm};
pub use terminal::TerminalApp;
pub use view::{Action, ReaderFooter, Screen, View};
