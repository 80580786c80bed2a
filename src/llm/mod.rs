// src/llm/mod.rs

pub mod gemini;
pub mod provider;

pub use gemini::GeminiConnector;
pub use provider::{ChatConfig, ChatConnector, ChatSession, ProviderError};
