//! Provider abstraction for the storyteller chat service
//!
//! A `ChatConnector` opens conversations; each `ChatSession` owns the
//! turn history for one story and returns the raw reply text per turn.

use async_trait::async_trait;
use serde_json::Value;

/// Error types for chat providers
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Provider error: {0}")]
    Remote(String),

    #[error("Reply contained no text")]
    EmptyReply,
}

/// Fixed settings for one conversation
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub system_instruction: String,
    /// Structured-output schema the reply must follow
    pub response_schema: Value,
}

/// One live conversation with the chat service
#[async_trait]
pub trait ChatSession: Send {
    /// Send one user turn and return the raw reply text
    async fn send_message(&mut self, message: &str) -> Result<String, ProviderError>;
}

/// Factory for conversations
pub trait ChatConnector: Send + Sync {
    fn create_chat(&self, api_key: &str, config: ChatConfig) -> Box<dyn ChatSession>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;
}
