//! Structured-extraction client: chat wire types and the OpenAI implementation.
//!
//! The pipeline talks to the service exclusively through the
//! [`StructuredExtraction`] trait — "given an ordered message list and a
//! response schema, return a schema-conformant JSON document or an error".
//! That seam keeps the pipeline testable against a fake implementation and
//! leaves the concrete HTTP plumbing in one place.
//!
//! [`OpenAiExtractor`] is the production implementation: one POST to
//! `{api_base}/chat/completions` with a `json_schema` response format,
//! bearer auth, and a bounded request timeout. It performs no retries
//! itself — the retry loop lives in [`crate::pipeline::llm`] so fakes get
//! the same treatment as the real client.

use crate::error::ExtractError;
use crate::schema::ResponseSchema;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

// ── Chat wire types ──────────────────────────────────────────────────────

/// Message author role. Only `system` and `user` turns are ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One unit of a multimodal user turn: text or an inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// An image part wrapping an inline data URI
    /// (`data:image/jpeg;base64,<payload>`).
    pub fn image(data_uri: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: data_uri.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Message content: a bare string for system turns, a part list for
/// multimodal user turns. Untagged so it serializes exactly as the chat
/// completions API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One message in the extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(parts: Vec<ContentPart>) -> Self {
        ChatMessage {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }
}

// ── Trait seam ───────────────────────────────────────────────────────────

/// The raw structured response returned by the service.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Parsed JSON content, surfaced verbatim — no mutation, no re-keying.
    pub content: Value,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A structured-extraction client: send an ordered message list constrained
/// by a response schema, get back a JSON document or an error.
///
/// Implemented by [`OpenAiExtractor`] for production and by fakes in tests
/// (set via [`crate::config::ExtractionConfig::extractor`]).
#[async_trait]
pub trait StructuredExtraction: Send + Sync {
    async fn extract(
        &self,
        messages: &[ChatMessage],
        schema: &ResponseSchema,
    ) -> Result<Extraction, ExtractError>;
}

// ── OpenAI implementation ────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: &'a ResponseSchema,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Extraction client for the OpenAI chat completions API (or any
/// OpenAI-compatible endpoint supporting `json_schema` response formats).
pub struct OpenAiExtractor {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiExtractor {
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base: api_base.into(),
            model: model.into(),
            timeout_secs,
        })
    }
}

#[async_trait]
impl StructuredExtraction for OpenAiExtractor {
    async fn extract(
        &self,
        messages: &[ChatMessage],
        schema: &ResponseSchema,
    ) -> Result<Extraction, ExtractError> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages,
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: schema,
            },
        };

        debug!("POST {} (model={}, {} messages)", url, self.model, messages.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractError::ApiTimeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    ExtractError::Network {
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let detail = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ExtractError::AuthError {
                api_base: self.api_base.clone(),
                detail,
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            return Err(ExtractError::RateLimitExceeded { retry_after_secs });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ExtractError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| ExtractError::ApiError {
            status: status.as_u16(),
            message: format!("malformed response body: {e}"),
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::ApiError {
                status: status.as_u16(),
                message: "response contained no choices".to_string(),
            })?;

        if let Some(refusal) = choice.message.refusal {
            if !refusal.is_empty() {
                return Err(ExtractError::Refusal { message: refusal });
            }
        }

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ExtractError::ApiError {
                status: status.as_u16(),
                message: "response contained no content".to_string(),
            })?;

        let value: Value =
            serde_json::from_str(&content).map_err(|e| ExtractError::SchemaViolation {
                detail: format!("content is not valid JSON: {e}"),
            })?;

        let usage = parsed.usage.unwrap_or_default();
        debug!(
            "extraction response: {} prompt tokens, {} completion tokens",
            usage.prompt_tokens, usage.completion_tokens
        );

        Ok(Extraction {
            content: value,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}
