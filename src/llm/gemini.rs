//! Gemini provider for story turns
//!
//! Uses Gemini's generateContent API with a JSON response schema.
//! The REST endpoint is stateless, so each chat keeps its own history
//! and resends it on every turn.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::provider::{ChatConfig, ChatConnector, ChatSession, ProviderError};
use crate::config::StoryConfig;

/// Opens Gemini chats against a configurable endpoint
pub struct GeminiConnector {
    client: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl GeminiConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &StoryConfig) -> Self {
        Self::new(config.gemini_base_url.clone(), config.request_timeout())
    }
}

impl ChatConnector for GeminiConnector {
    fn create_chat(&self, api_key: &str, config: ChatConfig) -> Box<dyn ChatSession> {
        Box::new(GeminiChat {
            id: Uuid::new_v4(),
            client: self.client.clone(),
            url: generate_content_url(&self.base_url, &config.model),
            api_key: api_key.to_string(),
            timeout: self.timeout,
            config,
            history: Vec::new(),
        })
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// A single story conversation
pub struct GeminiChat {
    id: Uuid,
    client: HttpClient,
    url: String,
    api_key: String,
    timeout: Duration,
    config: ChatConfig,
    history: Vec<GeminiContent>,
}

impl GeminiChat {
    fn build_request(&self, message: &str) -> GeminiRequest {
        let mut contents = self.history.clone();
        contents.push(GeminiContent::text("user", message));

        GeminiRequest {
            contents,
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiTextPart {
                    text: self.config.system_instruction.clone(),
                }],
            }),
            generation_config: Some(GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: self.config.response_schema.clone(),
            }),
        }
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        self.history.len()
    }
}

#[async_trait]
impl ChatSession for GeminiChat {
    async fn send_message(&mut self, message: &str) -> Result<String, ProviderError> {
        let api_request = self.build_request(message);
        debug!(chat = %self.id, turns = self.history.len() / 2, "Sending Gemini turn");

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&api_request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(chat = %self.id, "Gemini API error: {}", status);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let api_response: GeminiResponse = response.json().await?;
        let text = extract_reply(api_response)?;

        // History only grows once a turn has fully succeeded
        self.history.push(GeminiContent::text("user", message));
        self.history.push(GeminiContent::text("model", &text));

        Ok(text)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_reply(response: GeminiResponse) -> Result<String, ProviderError> {
    if let Some(error) = response.error {
        return Err(ProviderError::Remote(error.message));
    }

    if let Some(usage) = &response.usage_metadata {
        debug!(
            input_tokens = usage.prompt_token_count.unwrap_or(0),
            output_tokens = usage.candidates_token_count.unwrap_or(0),
            "Gemini usage"
        );
    }

    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::EmptyReply);
    }
    Ok(text)
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize, Clone, Debug)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiTextPart>,
}

impl GeminiContent {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![GeminiTextPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
struct GeminiTextPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config() -> ChatConfig {
        ChatConfig {
            model: "gemini-2.5-flash".into(),
            system_instruction: "Be a storyteller".into(),
            response_schema: json!({ "type": "OBJECT" }),
        }
    }

    fn test_chat() -> GeminiChat {
        GeminiChat {
            id: Uuid::new_v4(),
            client: HttpClient::new(),
            url: generate_content_url("https://example.test/", "gemini-2.5-flash"),
            api_key: "test_key".into(),
            timeout: Duration::from_secs(5),
            config: test_config(),
            history: Vec::new(),
        }
    }

    #[test]
    fn test_generate_content_url() {
        assert_eq!(
            generate_content_url("https://example.test/", "gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_shape() {
        let mut chat = test_chat();
        chat.history.push(GeminiContent::text("user", "first"));
        chat.history.push(GeminiContent::text("model", "{}"));

        let body = serde_json::to_value(chat.build_request("second")).unwrap();

        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["role"], "user");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "second");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be a storyteller");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        // Building a request must not touch history
        assert_eq!(chat.history_len(), 2);
    }

    #[test]
    fn test_extract_reply_joins_text_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"storyPart\":" }, { "text": "\"x\"}" }] }
            }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 4 }
        }))
        .unwrap();

        assert_eq!(extract_reply(response).unwrap(), "{\"storyPart\":\"x\"}");
    }

    #[test]
    fn test_extract_reply_errors() {
        let response: GeminiResponse =
            serde_json::from_value(json!({ "error": { "message": "quota exceeded" } })).unwrap();
        assert!(matches!(extract_reply(response), Err(ProviderError::Remote(m)) if m == "quota exceeded"));

        let response: GeminiResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(matches!(extract_reply(response), Err(ProviderError::EmptyReply)));

        let response: GeminiResponse =
            serde_json::from_value(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).unwrap();
        assert!(matches!(extract_reply(response), Err(ProviderError::EmptyReply)));
    }

    #[test]
    fn test_connector_name() {
        let connector = GeminiConnector::new("https://example.test", Duration::from_secs(1));
        assert_eq!(connector.name(), "Gemini");
        let _chat = connector.create_chat("k", test_config());
    }
}
