//! # pdf2profile
//!
//! Extract structured profile data from PDF resumes using Vision Language
//! Models (VLMs).
//!
//! ## Why this crate?
//!
//! Resumes are visually dense documents — multi-column layouts, icon-marked
//! contact lines, skill grids — that plain PDF text extraction mangles.
//! Instead this crate rasterises each page into a JPEG and lets a vision
//! model read it as a human would, constrained by a JSON Schema so the
//! answer always comes back as the same typed `Profile` shape: name,
//! contact info, current title, and qualifications.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input   validate the local file (exists, readable, %PDF magic)
//!  ├─ 2. Render  rasterise every page via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Encode  JPEG → base64 data URIs
//!  ├─ 4. LLM     ONE schema-constrained chat request carrying all pages
//!  └─ 5. Output  validated Profile + run stats
//! ```
//!
//! All pages travel in a single multimodal request; there is no per-page
//! fan-out and no durable state. The service response is validated by
//! deserializing into [`Profile`] — a missing or mistyped field is an error,
//! never a partial result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2profile::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from OPENAI_API_KEY unless set on the config
//!     let config = ExtractionConfig::default();
//!     let output = extract("profile.pdf", &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&output.profile)?);
//!     eprintln!("tokens: {} in / {} out",
//!         output.stats.prompt_tokens,
//!         output.stats.completion_tokens);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2profile` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2profile = { version = "0.1", default-features = false }
//! ```
//!
//! ## Testing against a fake service
//!
//! The service call goes through the [`StructuredExtraction`] trait; set
//! [`ExtractionConfig::extractor`] to a fake implementation to exercise the
//! whole pipeline without network access or an API key.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod schema;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{ChatMessage, ContentPart, Extraction, MessageContent, OpenAiExtractor, Role,
    StructuredExtraction};
pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::ExtractError;
pub use extract::{extract, extract_from_bytes, extract_sync};
pub use output::{ExtractionOutput, ExtractionStats};
pub use schema::{profile_schema, ContactInfo, Profile, ResponseSchema};
