//! Web server binary for clarity-ai.
//!
//! A thin shim over the library crate: maps CLI flags to `ServiceConfig`,
//! resolves the LLM provider, and serves the axum router.

use anyhow::{Context, Result};
use clap::Parser;
use clarity_ai::{create_router, llm, AnalysisService, AppState, ServiceConfig, DEFAULT_MODEL};
use std::io;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on the default address (0.0.0.0:8080)
  clarity

  # Local-only on another port
  clarity --bind 127.0.0.1:3000

  # Use a different Gemini model and a tighter LLM timeout
  clarity --model gemini-1.5-pro --llm-timeout 30

ENDPOINTS:
  GET  /           single-page front end
  POST /clarify    {"text": ...} or multipart file field "file" (PDF/DOCX/TXT)
  POST /followup   {"original_text", "previous_analysis", "question"}

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        Google Gemini API key (required for analysis; the
                        server still starts without it and rejects requests)
  GEMINI_MODEL          Override model ID
  CLARITY_BIND          Override listen address
  CLARITY_LLM_TIMEOUT   Per-request LLM timeout in seconds (1-300)
  RUST_LOG              Override the log filter (e.g. clarity_ai=debug)

  A .env file in the working directory is loaded at startup.

SETUP:
  1. Set API key:  export GEMINI_API_KEY=...
  2. Serve:        clarity
  3. Open:         http://localhost:8080/
"#;

/// Run the ClarityAI web service.
#[derive(Parser, Debug)]
#[command(
    name = "clarity",
    version,
    about = "Analyze text, URLs, and documents into summaries, action items, and deadlines",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Socket address to serve on.
    #[arg(long, env = "CLARITY_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Gemini model ID.
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Per-request LLM call timeout in seconds (1-300).
    #[arg(long, env = "CLARITY_LLM_TIMEOUT", default_value_t = 60)]
    llm_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CLARITY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CLARITY_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so both clap `env =` args and the API key resolution see it.
    dotenvy::dotenv().ok();
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

    // ── Build config and resolve the provider ────────────────────────────
    let mut config = ServiceConfig::builder()
        .model(&cli.model)
        .llm_timeout_secs(cli.llm_timeout)
        .build()
        .context("Invalid configuration")?;

    config.provider = llm::resolve_provider(&config).context("Failed to set up the LLM provider")?;
    if let Some(ref provider) = config.provider {
        info!(
            "Analysis provider: {} ({}, {}s timeout)",
            provider.name(),
            cli.model,
            config.llm_timeout_secs
        );
    }

    // ── Serve ────────────────────────────────────────────────────────────
    let state = AppState::new(AnalysisService::new(config));
    let app = create_router(state);

    let listener = TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cli.bind))?;
    let addr = listener.local_addr().context("Failed to read local address")?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
