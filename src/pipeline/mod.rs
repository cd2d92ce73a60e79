//! Pipeline stages for profile extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. switch rendering backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm
//! (path)    (pdfium)   (base64    (one structured
//!                       JPEG)      service call)
//! ```
//!
//! 1. [`input`]  — validate the user-supplied path and PDF magic bytes
//! 2. [`render`] — rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`] — JPEG-encode and base64-wrap each `DynamicImage` into a
//!    [`encode::PageImage`] for the multimodal request body
//! 4. [`llm`]    — assemble the single extraction request, drive the service
//!    call with retry/backoff, validate the response against the schema

pub mod encode;
pub mod input;
pub mod llm;
pub mod render;
