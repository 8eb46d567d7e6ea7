use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::LlmConfig;

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 2000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("unexpected response shape: {0}")]
    Shape(String),
}

/// One text-generation request against a named model. Implementations do not
/// retry.
#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    async fn generate(&self, directive: &str, model: &str) -> Result<String, LlmError>;
}

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &LlmConfig, client: reqwest::Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            client,
        }
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
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

fn extract_text(body: &str) -> Result<String, LlmError> {
    let result: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::Shape(format!("undecodable body: {}", e)))?;

    let candidate = result
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .ok_or_else(|| LlmError::Shape("no candidates".to_string()))?;

    candidate
        .content
        .as_ref()
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.clone())
        .ok_or_else(|| {
            let reason = candidate.finish_reason.as_deref().unwrap_or("UNKNOWN");
            LlmError::Shape(format!("first candidate has no text (finish reason: {})", reason))
        })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, directive: &str, model: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: directive.to_string() }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let timeout = self.timeout;
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                LlmError::Timeout(timeout)
            } else {
                // The request URL carries the API key.
                LlmError::Transport(e.without_url())
            }
        };

        let resp = self
            .client
            .post(&url)
            .json(&request_body)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(LlmError::Status { code: status.as_u16(), body });
        }

        extract_text(&body)
    }
}
