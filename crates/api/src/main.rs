use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod metrics;
mod pipeline;
mod retention;
mod routes;

use config::{AppConfig, LogFormat};

/// Used when `RUST_LOG` is unset. `TraceLayer` emits request spans at debug.
const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format);

    if config.openai.api_key.is_none() {
        anyhow::bail!("OPENAI_API_KEY must be set");
    }
    if !config.corpus_path.is_file() {
        tracing::warn!(
            corpus = %config.corpus_path.display(),
            "Knowledge corpus not found; requests will fail until it exists"
        );
    }

    let state = routes::AppState::from_config(&config);

    // Build router
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        corpus = %config.corpus_path.display(),
        output_dir = %config.output.dir.display(),
        retention = ?config.output.retention,
        "Spec generator listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
