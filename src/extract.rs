//! Extraction entry points.
//!
//! The run is a single linear sequence: resolve input → resolve the
//! extraction client → rasterise → encode → one service call → assemble
//! output. There is no branching beyond success/failure and no concurrency:
//! all pages travel together in one combined request.
//!
//! Ordering matters for error surfacing: a bad input path fails before the
//! credential is touched, and a missing credential fails before any page is
//! rendered or any byte leaves the machine.

use crate::client::{OpenAiExtractor, StructuredExtraction};
use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::{encode, input, llm, render};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Extract a structured profile from a PDF resume.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input` — Local file path to a PDF
/// * `config` — Extraction configuration
///
/// # Errors
/// Every failure is fatal ([`ExtractError`]): bad input path, missing
/// credential, corrupt PDF, service failure, or a response that violates the
/// profile schema. Individual pages that fail to render are dropped with a
/// warning instead (see `stats.skipped_pages`); only a document where every
/// page drops becomes [`ExtractError::EmptyDocument`].
pub async fn extract(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting extraction: {}", input.display());

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = input::resolve_local(&input.to_string_lossy())?;

    // ── Step 2: Resolve the extraction client ────────────────────────────
    // Before any rendering so a missing credential fails before any work.
    let extractor = resolve_extractor(config)?;

    // ── Step 3: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let (total_pages, rendered) = render::render_pages(&pdf_path, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!(
        "Rendered {}/{} pages in {}ms",
        rendered.len(),
        total_pages,
        render_duration_ms
    );

    // ── Step 4: Encode images to base64 JPEG ─────────────────────────────
    let pages = encode::encode_pages(&rendered);

    if pages.is_empty() {
        return Err(ExtractError::EmptyDocument {
            path: pdf_path,
            total: total_pages,
        });
    }
    let skipped_pages = total_pages - pages.len();

    // ── Step 5: One structured service call ──────────────────────────────
    let llm_start = Instant::now();
    let outcome = llm::extract_profile(&extractor, &pages, config).await?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;

    let stats = ExtractionStats {
        total_pages,
        encoded_pages: pages.len(),
        skipped_pages,
        retries: outcome.retries,
        prompt_tokens: outcome.prompt_tokens as u64,
        completion_tokens: outcome.completion_tokens as u64,
        render_duration_ms,
        llm_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extraction complete: {} pages, {} tokens in / {} out, {}ms total",
        stats.encoded_pages, stats.prompt_tokens, stats.completion_tokens, stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        profile: outcome.profile,
        stats,
    })
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Extract a profile from PDF bytes in memory.
///
/// Internally writes `bytes` to a managed [`tempfile`] that is removed
/// automatically on return or panic, so no artifact outlives the run. This
/// is the recommended API when the PDF comes from a database, upload, or
/// network stream rather than a file on disk.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    if !input::looks_like_pdf(bytes) {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(ExtractError::NotAPdf {
            path: "<in-memory>".into(),
            magic,
        });
    }

    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_path_buf();
    // `tmp` is dropped (and the file deleted) when `extract` returns
    extract(&path, config).await
}

/// Resolve the extraction client, from most-specific to least-specific.
///
/// 1. **Pre-built extractor** (`config.extractor`) — used as-is. The hook
///    for tests and for callers needing custom middleware.
/// 2. **Configured key** (`config.api_key`) — build an [`OpenAiExtractor`]
///    against `config.api_base` with `config.model`.
/// 3. **Environment** — `OPENAI_API_KEY`, the conventional variable.
///
/// A missing credential is [`ExtractError::MissingApiKey`], surfaced before
/// any network activity or rendering work.
fn resolve_extractor(
    config: &ExtractionConfig,
) -> Result<Arc<dyn StructuredExtraction>, ExtractError> {
    if let Some(ref extractor) = config.extractor {
        return Ok(Arc::clone(extractor));
    }

    let api_key = match config.api_key.clone() {
        Some(key) if !key.is_empty() => key,
        _ => match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => key,
            _ => return Err(ExtractError::MissingApiKey),
        },
    };

    let extractor = OpenAiExtractor::new(
        api_key,
        &config.api_base,
        &config.model,
        config.api_timeout_secs,
    )?;
    Ok(Arc::new(extractor))
}
