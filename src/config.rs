//! Configuration types for profile extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs, log them, and diff two runs to understand why
//! their outputs differ.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::client::StructuredExtraction;
use crate::error::ExtractError;
use std::fmt;
use std::sync::Arc;

/// Default model identifier sent to the extraction service.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default service endpoint root.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for a profile extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2profile::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .scale(2.0)
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Page rendering scale factor. Range: 0.5–6.0. Default: 2.0.
    ///
    /// 2.0 doubles the page viewport before rasterising, sharp enough for a
    /// vision model to read small resume type reliably while keeping the
    /// combined request body well below API upload limits.
    pub scale: f32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 4096.
    ///
    /// A safety cap independent of scale: an A2 poster at 6x could otherwise
    /// allocate hundreds of megapixels. Either dimension is capped, the other
    /// scaled proportionally.
    pub max_rendered_pixels: u32,

    /// Model identifier, e.g. "gpt-4o-mini", "gpt-4o".
    pub model: String,

    /// API key for the extraction service. If None, read from the
    /// `OPENAI_API_KEY` environment variable; absence of both is fatal
    /// before any work begins.
    pub api_key: Option<String>,

    /// Service endpoint root, e.g. "https://api.openai.com/v1".
    ///
    /// Point this at any OpenAI-compatible endpoint that supports
    /// `json_schema` response formats.
    pub api_base: String,

    /// Bounded timeout for the service call in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Maximum retry attempts on a transient service failure. Default: 3.
    ///
    /// Only 429, 5xx, and timeouts are retried. Permanent errors (bad key,
    /// refusal, schema violation) surface immediately.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Custom system prompt. If None, uses [`crate::prompts::SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Custom user instruction text. If None, uses [`crate::prompts::USER_PROMPT`].
    pub user_prompt: Option<String>,

    /// Pre-constructed extraction client. Takes precedence over
    /// `api_key`/`api_base`/`model`. Useful in tests or when the caller needs
    /// custom middleware (caching, rate-limiting).
    pub extractor: Option<Arc<dyn StructuredExtraction>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            max_rendered_pixels: 4096,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            api_timeout_secs: 60,
            max_retries: 3,
            retry_backoff_ms: 500,
            password: None,
            system_prompt: None,
            user_prompt: None,
            extractor: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("scale", &self.scale)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field(
                "extractor",
                &self.extractor.as_ref().map(|_| "<dyn StructuredExtraction>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale.clamp(0.5, 6.0);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.user_prompt = Some(prompt.into());
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn StructuredExtraction>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !(0.5..=6.0).contains(&c.scale) {
            return Err(ExtractError::InvalidConfig(format!(
                "Scale must be 0.5–6.0, got {}",
                c.scale
            )));
        }
        if c.model.is_empty() {
            return Err(ExtractError::InvalidConfig("Model must not be empty".into()));
        }
        if c.api_base.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "API base URL must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ExtractionConfig::default();
        assert_eq!(config.scale, 2.0);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.api_timeout_secs, 60);
        assert_eq!(config.max_retries, 3);
        assert!(config.api_key.is_none());
        assert!(config.extractor.is_none());
    }

    #[test]
    fn builder_clamps_scale() {
        let config = ExtractionConfig::builder().scale(99.0).build().unwrap();
        assert_eq!(config.scale, 6.0);

        let config = ExtractionConfig::builder().scale(0.1).build().unwrap();
        assert_eq!(config.scale, 0.5);
    }

    #[test]
    fn build_rejects_empty_model() {
        let err = ExtractionConfig::builder().model("").build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ExtractionConfig::builder()
            .api_key("sk-secret")
            .build()
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
