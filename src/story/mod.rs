// src/story/mod.rs
// Story domain: preferences, prompts, and reply parsing

pub mod preferences;
pub mod prompt;
pub mod response;

pub use preferences::{PreferenceField, ReadingLevel, StoryPreferences, Topic, UnknownOption};
pub use response::{parse_story_response, ResponseError, StoryResponse};
