//! Output types returned by the extraction entry points.

use crate::schema::Profile;
use serde::{Deserialize, Serialize};

/// Result of a successful extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// The extracted profile, exactly as the service returned it.
    pub profile: Profile,
    /// Run statistics.
    pub stats: ExtractionStats,
}

/// Statistics for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages encoded into the request.
    pub encoded_pages: usize,
    /// Pages dropped because rendering or encoding failed.
    pub skipped_pages: usize,
    /// Service-call attempts beyond the first.
    pub retries: u32,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub render_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub total_duration_ms: u64,
}
