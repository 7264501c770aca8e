//! Google Gemini backend for the generation capability.
//!
//! Sends one `generateContent` request per stage and returns the text of the
//! first candidate. Blank text is passed through unchanged: deciding that a
//! blank answer is a failure belongs to the result validator.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::error::PipelineError;
use crate::io::config::{GenerationConfig, GrammarConfig};
use crate::io::generator::Generator;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Non-blank API credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Reject missing or blank credentials at construction time.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::CapabilityUnavailable(
                "API key not found: store one with `grammar key set` or set GEMINI_API_KEY"
                    .to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationParams>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl GenerationParams {
    fn from_config(config: &GenerationConfig) -> Option<Self> {
        if config.temperature.is_none() && config.max_output_tokens.is_none() {
            return None;
        }
        Some(Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(anyhow!("prompt blocked: {reason}"));
            }
            return Ok(String::new());
        };
        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason == "SAFETY" || reason == "RECITATION" {
                return Err(anyhow!("response withheld: finish reason {reason}"));
            }
        }
        Ok(candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

/// Gemini `generateContent` client bound to one API key and model.
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    generation: Option<GenerationParams>,
}

impl GeminiGenerator {
    /// Build the HTTP client with the key installed as a default header.
    ///
    /// Fails with `CapabilityUnavailable` when the key cannot be sent as a
    /// header value or the client cannot be constructed.
    pub fn new(api_key: ApiKey, config: &GrammarConfig) -> Result<Self, PipelineError> {
        let mut key_header = HeaderValue::from_str(api_key.expose()).map_err(|_| {
            PipelineError::CapabilityUnavailable(
                "API key contains characters that cannot be sent in an HTTP header".to_string(),
            )
        })?;
        key_header.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key_header);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| {
                PipelineError::CapabilityUnavailable(format!("build HTTP client: {err}"))
            })?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        info!(model = %config.model, "gemini generator ready");
        Ok(Self {
            client,
            endpoint,
            generation: GenerationParams::from_config(&config.generation),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    #[instrument(skip_all, fields(prompt_bytes = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation.clone(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .context("send generateContent request")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("read generateContent response")?;
        debug!(%status, response_bytes = text.len(), "gemini response");

        if !status.is_success() {
            warn!(%status, "gemini request failed");
            return Err(anyhow!("HTTP {status}: {}", text.trim()));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).context("parse generateContent response")?;
        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                prompt_tokens = ?usage.prompt_token_count,
                response_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "gemini usage"
            );
        }
        parsed.into_text()
    }
}
