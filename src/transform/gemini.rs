//! Blocking client for the Gemini `generateContent` endpoint.
//!
//! One request per document: the system instruction in its own slot, a
//! single user turn (file name + text), and a generation config that pins the
//! sampling parameters and asks the provider for `application/json` output.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::library::model::ModuleRecord;
use crate::transform::{
    API_KEY_ENV, ModelConfig, TransformError, TransformResult, Transformer, parse_response, prompt,
};

const RESPONSE_MIME_TYPE: &str = "application/json";

/// Gemini REST client.
pub struct GeminiClient {
    config: ModelConfig,
    api_key: String,
    agent: ureq::Agent,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a client, resolving the API key from the config or `GEMINI_API_KEY`.
    pub fn new(config: ModelConfig) -> TransformResult<Self> {
        let api_key = config.resolve_api_key(std::env::var(API_KEY_ENV).ok())?;
        Ok(Self::with_api_key(config, api_key))
    }

    /// Create a client with an explicit API key.
    pub fn with_api_key(config: ModelConfig, api_key: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            config,
            api_key: api_key.into(),
            agent,
        }
    }

    /// Full URL of the generate endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Model name in use.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body<'a>(&'a self, message: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: self.config.system_instruction(),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: message }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: RESPONSE_MIME_TYPE,
            },
        }
    }

    /// Send one document and return the model's raw text.
    pub fn generate(&self, filename: &str, text: &str) -> TransformResult<String> {
        let message = prompt::user_message(filename, text);
        let body_str = serde_json::to_string(&self.request_body(&message)).map_err(|e| {
            TransformError::RequestFailed {
                message: format!("JSON serialize error: {e}"),
            }
        })?;

        let resp = self
            .agent
            .post(&self.endpoint())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", &self.api_key)
            .send_string(&body_str)
            .map_err(|e| match e {
                ureq::Error::Status(status, resp) => TransformError::Status {
                    status,
                    body: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => TransformError::RequestFailed {
                    message: t.to_string(),
                },
            })?;

        let resp_str = resp.into_string().map_err(|e| TransformError::ParseError {
            message: format!("read response body: {e}"),
        })?;

        response_text(&resp_str)
    }
}

/// Text of the first candidate, all parts concatenated.
fn response_text(body: &str) -> TransformResult<String> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| TransformError::ParseError {
            message: format!("response envelope: {e}"),
        })?;

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked ({r})"))
            .unwrap_or_else(|| "no candidates".into());
        return Err(TransformError::EmptyResponse { reason });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(TransformError::EmptyResponse {
            reason: candidate
                .finish_reason
                .unwrap_or_else(|| "candidate has no text".into()),
        });
    }
    Ok(text)
}

impl Transformer for GeminiClient {
    fn transform(&self, text: &str, filename: &str) -> TransformResult<ModuleRecord> {
        tracing::info!(file = filename, model = %self.config.model, chars = text.chars().count(), "analyzing document");
        let raw = self.generate(filename, text)?;
        parse_response(&raw)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
