//! Error types for the pdf2profile library.
//!
//! The extraction run has a single linear path — resolve input, rasterise,
//! call the service once, print — so every error is fatal and aborts the run.
//! [`ExtractError`] is the one taxonomy: input problems, PDF problems,
//! configuration problems, and service-call problems.
//!
//! The only non-aborting condition is a single page that fails to render or
//! encode: it is dropped from the image sequence with a warning and counted
//! in [`crate::output::ExtractionStats::skipped_pages`]. That is a data-shaping
//! decision, not an error (see [`crate::pipeline::render`]).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2profile library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render failed for the whole document.
    #[error("Rasterisation failed: {detail}")]
    RasterisationFailed { detail: String },

    /// Every page was dropped; there is nothing to send to the service.
    #[error("No page of '{path}' produced an image ({total} pages, all dropped)")]
    EmptyDocument { path: PathBuf, total: usize },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key in the config and none in the environment.
    #[error("No API key configured.\nSet OPENAI_API_KEY or pass one via ExtractionConfig::builder().api_key(...).")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Service errors ────────────────────────────────────────────────────
    /// The extraction service returned a non-retryable HTTP error.
    #[error("Extraction service error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The service returned an authentication error (401/403).
    #[error("Authentication failed against '{api_base}': {detail}\nCheck OPENAI_API_KEY.")]
    AuthError { api_base: String, detail: String },

    /// HTTP 429 — caller should back off. `retry_after_secs` carries the
    /// server-specified delay when present.
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    /// The service call exceeded the configured timeout.
    #[error("Extraction request timed out after {secs}s\nIncrease --api-timeout.")]
    ApiTimeout { secs: u64 },

    /// The request never reached the service (DNS, connect, TLS).
    #[error("Network error calling the extraction service: {detail}\nCheck your internet connection.")]
    Network { detail: String },

    /// The model declined to answer.
    #[error("The model refused the extraction request: {message}")]
    Refusal { message: String },

    /// The response content did not conform to the profile schema.
    #[error("Service response violates the profile schema: {detail}")]
    SchemaViolation { detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium as a system library."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Whether retrying the service call may succeed.
    ///
    /// Rate limits, timeouts, and 5xx responses are transient; everything
    /// else (auth, refusal, schema violation, 4xx) is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::RateLimitExceeded { .. }
            | ExtractError::ApiTimeout { .. }
            | ExtractError::Network { .. } => true,
            ExtractError::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
