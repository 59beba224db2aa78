//! IRSight - investor relations document sentiment analysis.
//!
//! A service for uploading IR documents (press releases, earnings call
//! recordings), scoring their sentiment and linguistic quality with local
//! Ollama models, and serving the results over a JSON API.

mod cli;
mod config;
mod extract;
mod llm;
mod models;
mod repository;
mod schema;
mod server;
mod services;
mod storage;
mod transcribe;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "irsight=info"
    } else {
        "irsight=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
