//! Service interaction: assemble the extraction request and drive the call.
//!
//! This module is intentionally thin — all prompt text lives in
//! [`crate::prompts`] and all HTTP plumbing in [`crate::client`], so each can
//! change without touching the retry or validation logic here.
//!
//! ## Request layout
//!
//! The request contains exactly two messages:
//! 1. **System message** — the extraction task instruction (or a
//!    user-supplied override)
//! 2. **User message** — `1 + N` content parts: the instruction text first,
//!    then one inline JPEG data URI per page, in page order
//!
//! ## Retry strategy
//!
//! HTTP 429 / 5xx / timeouts are transient. The delay doubles after each
//! attempt: with a 500 ms base and 3 retries the sequence is 500 ms, 1 s,
//! 2 s. Permanent errors (auth, refusal, schema violation) surface
//! immediately.

use crate::client::{ChatMessage, ContentPart, StructuredExtraction};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::pipeline::encode::PageImage;
use crate::prompts::{SYSTEM_PROMPT, USER_PROMPT};
use crate::schema::{profile_schema, Profile};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// The validated outcome of the service call.
#[derive(Debug, Clone)]
pub struct LlmOutcome {
    pub profile: Profile,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// Attempts beyond the first.
    pub retries: u32,
}

/// Backoff delay before retry `attempt` (1-based), doubling per attempt.
///
/// The exponent is capped so absurd `max_retries` values saturate the delay
/// instead of overflowing: past attempt 11 the wait stays at `base * 1024`.
fn backoff_delay(base_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1).min(10)))
}

/// Assemble the extraction request messages.
///
/// Exposed (rather than inlined into [`extract_profile`]) so the message
/// shape — part count and ordering — is directly testable.
pub fn build_messages(pages: &[PageImage], config: &ExtractionConfig) -> Vec<ChatMessage> {
    let system = config.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT);
    let user_text = config.user_prompt.as_deref().unwrap_or(USER_PROMPT);

    let mut parts = Vec::with_capacity(1 + pages.len());
    parts.push(ContentPart::text(user_text));
    for page in pages {
        parts.push(ContentPart::image(page.data_uri()));
    }

    vec![ChatMessage::system(system), ChatMessage::user(parts)]
}

/// Send the page images to the service and validate the structured response.
///
/// One logical call per run; transient failures are retried with backoff.
/// The returned profile is the service content deserialized verbatim — a
/// response missing a required field fails with
/// [`ExtractError::SchemaViolation`] rather than producing a partial result.
pub async fn extract_profile(
    extractor: &Arc<dyn StructuredExtraction>,
    pages: &[PageImage],
    config: &ExtractionConfig,
) -> Result<LlmOutcome, ExtractError> {
    let messages = build_messages(pages, config);
    let schema = profile_schema();

    debug!(
        "Extraction request: {} pages, {} content parts in user turn",
        pages.len(),
        pages.len() + 1
    );

    let mut attempt: u32 = 0;
    loop {
        match extractor.extract(&messages, &schema).await {
            Ok(extraction) => {
                let profile: Profile = serde_json::from_value(extraction.content)
                    .map_err(|e| ExtractError::SchemaViolation {
                        detail: e.to_string(),
                    })?;
                return Ok(LlmOutcome {
                    profile,
                    prompt_tokens: extraction.prompt_tokens,
                    completion_tokens: extraction.completion_tokens,
                    retries: attempt,
                });
            }
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                attempt += 1;
                let backoff = backoff_delay(config.retry_backoff_ms, attempt);
                warn!(
                    "Extraction attempt {}/{} failed ({}), retrying in {}ms",
                    attempt, config.max_retries, e, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
