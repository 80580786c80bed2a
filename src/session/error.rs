// src/session/error.rs

use crate::llm::ProviderError;
use crate::story::ResponseError;

pub const CONFIGURATION_MESSAGE: &str = "API key is not configured.";
pub const START_FAILED_MESSAGE: &str = "Đã xảy ra lỗi khi tạo câu chuyện. Vui lòng thử lại.";
pub const CONTINUE_FAILED_MESSAGE: &str = "Đã xảy ra lỗi khi tiếp tục câu chuyện. Vui lòng thử lại.";

/// Why a story turn failed
///
/// Only logs see the difference; the reader gets one message per operation.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("API key is not configured")]
    Configuration,

    #[error("Chat service failed: {0}")]
    Service(#[from] ProviderError),

    #[error("Malformed story reply: {0}")]
    MalformedResponse(#[from] ResponseError),

    #[error("A story turn is already in progress")]
    Busy,
}

/// Which controller operation produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Continue,
}

impl StoryError {
    /// Message shown in the error banner
    pub fn user_message(&self, op: Operation) -> &'static str {
        match (self, op) {
            (StoryError::Configuration, _) => CONFIGURATION_MESSAGE,
            (_, Operation::Start) => START_FAILED_MESSAGE,
            (_, Operation::Continue) => CONTINUE_FAILED_MESSAGE,
        }
    }
}
