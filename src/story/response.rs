// src/story/response.rs
// Parse and validate the storyteller's structured reply

use serde_json::Value;

/// One storyteller turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryResponse {
    pub story_part: String,
    /// Exactly two entries, or none when the story is over
    pub choices: Vec<String>,
}

impl StoryResponse {
    pub fn is_ending(&self) -> bool {
        self.choices.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Reply has the wrong shape: {0}")]
    Shape(String),
}

/// Drop a surrounding ```json fence if the model added one
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse raw reply text into a validated `StoryResponse`
pub fn parse_story_response(raw: &str) -> Result<StoryResponse, ResponseError> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;

    let object = value
        .as_object()
        .ok_or_else(|| ResponseError::Shape("expected a JSON object".into()))?;

    let story_part = object
        .get("storyPart")
        .and_then(Value::as_str)
        .ok_or_else(|| ResponseError::Shape("missing string field 'storyPart'".into()))?;

    let choices = object
        .get("choices")
        .and_then(Value::as_array)
        .ok_or_else(|| ResponseError::Shape("missing array field 'choices'".into()))?
        .iter()
        .map(|c| {
            c.as_str()
                .map(str::to_string)
                .ok_or_else(|| ResponseError::Shape("'choices' must hold strings".into()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !(choices.is_empty() || choices.len() == 2) {
        return Err(ResponseError::Shape(format!(
            "expected 0 or 2 choices, got {}",
            choices.len()
        )));
    }

    Ok(StoryResponse {
        story_part: story_part.to_string(),
        choices,
    })
}
