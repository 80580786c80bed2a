// src/config/mod.rs
// Loads story settings from the environment (and .env when present)

use once_cell::sync::Lazy;
use std::str::FromStr;
use std::time::Duration;
use tracing::{warn, Level};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct StoryConfig {
    // ── Gemini Configuration
    /// Missing key is not fatal here; starting a story reports it instead.
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_base_url: String,
    pub request_timeout_secs: u64,
}

// Trims whitespace and inline comments before parsing, so `KEY=42 # note` works.
fn var_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        None => default,
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl StoryConfig {
    /// Build from process environment, loading `.env` first if it exists
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(&lookup, "API_KEY").or_else(|| non_empty(&lookup, "GEMINI_API_KEY"));

        Self {
            api_key,
            model: var_or(&lookup, "STORY_MODEL", DEFAULT_MODEL.to_string()),
            gemini_base_url: var_or(&lookup, "GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL.to_string()),
            request_timeout_secs: var_or(&lookup, "STORY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

pub static CONFIG: Lazy<StoryConfig> = Lazy::new(StoryConfig::from_env);

/// Log level from `STORY_LOG_LEVEL`, read before any subscriber exists
///
/// Unset means INFO. An unparsable value comes back as `Err` with the raw
/// text so the caller can report it once logging is up.
pub fn log_level_from_env() -> Result<Level, String> {
    let _ = dotenvy::dotenv();
    log_level_from_lookup(|key| std::env::var(key).ok())
}

pub fn log_level_from_lookup<F>(lookup: F) -> Result<Level, String>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = non_empty(&lookup, "STORY_LOG_LEVEL") else {
        return Ok(Level::INFO);
    };
    let clean = raw.split('#').next().unwrap_or("").trim();
    if clean.is_empty() {
        return Ok(Level::INFO);
    }
    clean.parse::<Level>().map_err(|_| raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = StoryConfig::default();
        assert!(config.api_key.is_none());
        assert!(!config.has_api_key());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.gemini_base_url, DEFAULT_GEMINI_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_api_key_falls_back_to_gemini_key() {
        let config = StoryConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "g-key")]));
        assert_eq!(config.api_key.as_deref(), Some("g-key"));

        let config = StoryConfig::from_lookup(lookup_from(&[
            ("API_KEY", "primary"),
            ("GEMINI_API_KEY", "g-key"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let config = StoryConfig::from_lookup(lookup_from(&[("API_KEY", "   ")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_values_strip_comments_and_fall_back_on_parse_error() {
        let config = StoryConfig::from_lookup(lookup_from(&[
            ("STORY_REQUEST_TIMEOUT_SECS", " 30  # seconds"),
            ("STORY_MODEL", "gemini-2.5-pro"),
        ]));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.model, "gemini-2.5-pro");

        let config = StoryConfig::from_lookup(lookup_from(&[("STORY_REQUEST_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_log_level_lookup() {
        assert_eq!(log_level_from_lookup(lookup_from(&[])), Ok(Level::INFO));
        assert_eq!(
            log_level_from_lookup(lookup_from(&[("STORY_LOG_LEVEL", "debug  # noisy")])),
            Ok(Level::DEBUG)
        );
        assert_eq!(
            log_level_from_lookup(lookup_from(&[("STORY_LOG_LEVEL", "WARN")])),
            Ok(Level::WARN)
        );
        assert_eq!(
            log_level_from_lookup(lookup_from(&[("STORY_LOG_LEVEL", "loud")])),
            Err("loud".to_string())
        );
    }

    #[test]
    fn test_log_level_lookup_leaves_global_config_untouched() {
        let _ = log_level_from_lookup(lookup_from(&[("STORY_LOG_LEVEL", "trace")]));
        assert!(Lazy::get(&CONFIG).is_none());
    }

    #[test]
    fn test_with_model_overrides() {
        let config = StoryConfig::default().with_model("custom-model");
        assert_eq!(config.model, "custom-model");
    }
}
