//! Fixed instruction text for the extraction request.
//!
//! Centralising the prompts here keeps a single source of truth and lets
//! unit tests inspect them without a live service. Callers can override
//! either via [`crate::config::ExtractionConfig::system_prompt`] /
//! [`crate::config::ExtractionConfig::user_prompt`]; the constants are used
//! only when no override is provided.

/// System-level instruction establishing the assistant's task.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts profile information \
from resumes. Please extract the name, contact information, and key qualifications.";

/// Text part leading the user turn, ahead of the page images.
pub const USER_PROMPT: &str = "Please extract the profile information from this resume, \
including name, contact details, and key qualifications.";
