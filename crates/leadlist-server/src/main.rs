//! leadlist API server binary.
//!
//! Loads settings from the environment, builds the router, and serves the
//! sales-prospect pipeline over HTTP.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use leadlist_core::config::Settings;
use leadlist_server::state::AppState;

/// leadlist API server — builds sales-prospect lists from keywords.
#[derive(Parser)]
#[command(name = "leadlist-server", version, about)]
struct Cli {
    /// Port to listen on. Falls back to the PORT environment variable.
    #[arg(long)]
    port: Option<u16>,

    /// Host address to bind to.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let missing = settings.missing_required();
    if !missing.is_empty() {
        tracing::warn!(
            missing = missing.join(", "),
            "required environment variables absent; search endpoints will return 500"
        );
    }
    if !settings.cleansing_enabled() {
        tracing::warn!("OPENAI_API_KEY not set; LLM cleansing disabled");
    }
    if !settings.notifier_enabled() {
        tracing::info!("SLACK_BOT_TOKEN not set; notifier disabled");
    }

    let port = cli
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(8000);

    let state = Arc::new(AppState::new(settings));
    let router = leadlist_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", cli.host, port)).await?;
    tracing::info!("listening on http://{}:{}", cli.host, port);
    axum::serve(listener, router).await?;

    Ok(())
}
