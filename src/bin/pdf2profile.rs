//! CLI binary for pdf2profile.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints the extracted profile.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2profile::{extract, ExtractionConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract from the conventional path (./profile.pdf)
  pdf2profile

  # Extract from a specific file
  pdf2profile resume.pdf

  # Use a specific model and higher rendering fidelity
  pdf2profile --model gpt-4o --scale 3.0 resume.pdf

  # Full structured output (profile + run stats) as JSON
  pdf2profile --json resume.pdf > result.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY    API key for the extraction service (required)
  PDFIUM_LIB_PATH   Path to an existing libpdfium shared library

SETUP:
  1. Set API key:  export OPENAI_API_KEY=sk-...
  2. Extract:      pdf2profile resume.pdf
"#;

/// Extract structured profile data from a PDF resume using a vision LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2profile",
    version,
    about = "Extract structured profile data from PDF resumes using Vision LLMs",
    long_about = "Rasterise a PDF resume, send the page images to a vision language model in a \
single schema-constrained request, and print the extracted profile (name, contact info, \
current title, qualifications) as JSON.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    #[arg(default_value = "profile.pdf")]
    input: PathBuf,

    /// Model ID (e.g. gpt-4o-mini, gpt-4o).
    #[arg(long, env = "PDF2PROFILE_MODEL")]
    model: Option<String>,

    /// Service endpoint root (any OpenAI-compatible endpoint).
    #[arg(long, env = "PDF2PROFILE_API_BASE")]
    api_base: Option<String>,

    /// Page rendering scale factor (0.5–6.0).
    #[arg(long, env = "PDF2PROFILE_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PROFILE_PASSWORD")]
    password: Option<String>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "PDF2PROFILE_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Retries on transient service failures.
    #[arg(long, env = "PDF2PROFILE_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Service call timeout in seconds.
    #[arg(long, env = "PDF2PROFILE_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Output the full structured result (profile + stats) as JSON.
    #[arg(long, env = "PDF2PROFILE_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PROFILE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the result.
    #[arg(short, long, env = "PDF2PROFILE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli).await?;

    // ── Run extraction ───────────────────────────────────────────────────
    let output = extract(&cli.input, &config)
        .await
        .context("Extraction failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else {
        println!("Extracted Profile Information:");
        println!(
            "{}",
            serde_json::to_string_pretty(&output.profile)
                .context("Failed to serialise profile")?
        );
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}/{} pages  {} tokens in / {} out  {}ms total",
            output.stats.encoded_pages,
            output.stats.total_pages,
            output.stats.prompt_tokens,
            output.stats.completion_tokens,
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .scale(cli.scale)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref base) = cli.api_base {
        builder = builder.api_base(base);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}
