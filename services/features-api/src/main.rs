//! Features API Server
//!
//! OGC API - Features implementation for CityJSON city models.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use features_api::config::{Overrides, ServiceConfig, StorageBackend};
use features_api::routes::build_router;
use features_api::state::AppState;

/// Features API Server
#[derive(Parser, Debug)]
#[command(name = "features-api")]
#[command(about = "OGC API - Features server for CityJSON city models")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "FEATURES_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "FEATURES_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// YAML configuration file
    #[arg(short, long, env = "FEATURES_CONFIG")]
    config: Option<PathBuf>,

    /// Public base URL used in links
    #[arg(long, env = "FEATURES_BASE_URL")]
    base_url: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Storage backend (postgres or memory)
    #[arg(long, env = "FEATURES_STORAGE_BACKEND")]
    backend: Option<StorageBackend>,

    /// Storage call timeout in seconds
    #[arg(long, env = "FEATURES_QUERY_TIMEOUT_SECS")]
    query_timeout_secs: Option<u64>,

    /// Largest accepted `limit`
    #[arg(long, env = "FEATURES_MAX_LIMIT")]
    max_limit: Option<u32>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting Features API server");

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let config = ServiceConfig::load(args.config.as_deref())?
        .apply(Overrides {
            base_url: args.base_url,
            database_url: args.database_url,
            backend: args.backend,
            query_timeout_secs: args.query_timeout_secs,
            max_limit: args.max_limit,
        })
        .validate()?;

    info!(
        base_url = %config.base_url,
        backend = ?config.storage.backend,
        max_limit = config.paging.max_limit,
        "Configuration loaded"
    );

    let state = Arc::new(
        AppState::new(config, Some(metrics))
            .await
            .context("Failed to initialize application state")?,
    );

    let app = build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Features API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
