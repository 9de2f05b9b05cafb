//! Transformer: turns extracted text into a structured module record.
//!
//! The pipeline only sees the [`Transformer`] trait. The production
//! implementation is [`gemini::GeminiClient`], a single blocking
//! request/response exchange per document with no retries and no history;
//! tests substitute scripted transformers.

pub mod gemini;
pub mod prompt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::library::model::ModuleRecord;

pub use gemini::GeminiClient;

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Errors from the transform stage.
#[derive(Debug, Error, Diagnostic)]
pub enum TransformError {
    #[error("no API key configured")]
    #[diagnostic(
        code(raven::transform::missing_api_key),
        help("Set `model.api_key` in the config file or export GEMINI_API_KEY.")
    )]
    MissingApiKey,

    #[error("model request failed: {message}")]
    #[diagnostic(
        code(raven::transform::request_failed),
        help("Check network connectivity and the configured `model.base_url`.")
    )]
    RequestFailed { message: String },

    #[error("model provider returned HTTP {status}: {body}")]
    #[diagnostic(
        code(raven::transform::status),
        help("Check the API key, the model name, and the provider's quota.")
    )]
    Status { status: u16, body: String },

    #[error("model returned no text: {reason}")]
    #[diagnostic(
        code(raven::transform::empty_response),
        help("The request may have been blocked or cut off; inspect the source document.")
    )]
    EmptyResponse { reason: String },

    #[error("failed to parse model response: {message}")]
    #[diagnostic(
        code(raven::transform::parse_error),
        help("The model did not return valid JSON. Re-run the file or adjust the system instruction.")
    )]
    ParseError { message: String },
}

pub type TransformResult<T> = std::result::Result<T, TransformError>;

/// Capability: document text + file name in, module record out.
pub trait Transformer {
    fn transform(&self, text: &str, filename: &str) -> TransformResult<ModuleRecord>;
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn transform(&self, text: &str, filename: &str) -> TransformResult<ModuleRecord> {
        (**self).transform(text, filename)
    }
}

/// Parse the model's raw text into a record: trim, then JSON.
///
/// Only JSON validity is checked; the schema is advisory.
pub fn parse_response(text: &str) -> TransformResult<ModuleRecord> {
    ModuleRecord::from_json_str(text).map_err(|e| TransformError::ParseError {
        message: e.to_string(),
    })
}

/// Provider and sampling settings for the transformer.
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider credential. Falls back to the `GEMINI_API_KEY` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Replaces [`prompt::SYSTEM_INSTRUCTION`] when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_top_p() -> f64 {
    0.95
}
fn default_top_k() -> u32 {
    64
}
fn default_max_output_tokens() -> u32 {
    8192
}
fn default_timeout_secs() -> u64 {
    300
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
            system_instruction: None,
        }
    }
}

impl ModelConfig {
    /// The system instruction in effect.
    pub fn system_instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(prompt::SYSTEM_INSTRUCTION)
    }

    /// Resolve the credential from the config, then from `env_value`.
    ///
    /// Blank values count as absent.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> TransformResult<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_value.filter(|k| !k.trim().is_empty()))
            .ok_or(TransformError::MissingApiKey)
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_response_trims_and_parses() {
        let rec = parse_response("  \n{\"modules\": {\"id\": \"a\"}}\n").unwrap();
        assert_eq!(rec.module_field("id").as_deref(), Some("a"));
    }

    #[test]
    fn parse_response_rejects_non_json() {
        let err = parse_response("```json\n{}\n```").unwrap_err();
        assert!(matches!(err, TransformError::ParseError { .. }));
    }

    #[test]
    fn default_config_values() {
        let config = ModelConfig::default();
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_p, 0.95);
        assert_eq!(config.top_k, 64);
        assert_eq!(config.max_output_tokens, 8192);
        assert_eq!(config.system_instruction(), prompt::SYSTEM_INSTRUCTION);
    }

    #[test]
    fn api_key_prefers_config_then_env() {
        let mut config = ModelConfig::default();
        assert!(matches!(
            config.resolve_api_key(None),
            Err(TransformError::MissingApiKey)
        ));
        assert!(config.resolve_api_key(Some("  ".into())).is_err());
        assert_eq!(config.resolve_api_key(Some("env".into())).unwrap(), "env");

        config.api_key = Some("file".into());
        assert_eq!(config.resolve_api_key(Some("env".into())).unwrap(), "file");
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ModelConfig {
            api_key: Some("secret-key".into()),
            ..Default::default()
        };
        let shown = format!("{config:?}");
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("<redacted>"));
    }
}
