//! Cortex sidecar memory server.
//!
//! Axum REST adapter over `cortex-core`: config file discovery, tracing setup,
//! provider resolution, and the lifecycle scheduler's process-wide timer. No
//! business logic lives here — see `cortex-core` for the Sieve/Gate/Lifecycle
//! implementations this binary only dispatches to.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::middleware;
use clap::Parser;
use cortex_core::{default_vector_backend, Cortex, Store};
use cortex_server::state::AppState;
use cortex_server::{api, auth, config, providers, schedule};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cortex-server", version, about = "Sidecar memory service for AI agents")]
struct Cli {
    /// Path to a TOML config file. Falls back to CORTEX_CONFIG, then the
    /// platform config dir, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// `text` (default) or `json`.
    #[arg(long, default_value = "text")]
    log_format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_format);

    let cortex_config = config::load(cli.config.as_deref())?;

    let db_path = cortex_config
        .storage
        .db_path
        .clone()
        .map(PathBuf::from)
        .or_else(config::default_db_path);
    if let Some(parent) = db_path.as_deref().and_then(|p| p.parent()) {
        std::fs::create_dir_all(parent)?;
    }

    let vector = default_vector_backend(cortex_config.embedding.dimensions)?;
    let store = Arc::new(Store::new(db_path, cortex_config.storage.wal_mode, vector)?);

    let embedder = providers::resolve_embedder(&cortex_config.embedding);
    let extraction_llm = providers::resolve_llm(&cortex_config.llm.extraction);
    let lifecycle_llm = providers::resolve_llm(&cortex_config.llm.lifecycle);
    // The writer's arbitration step isn't a distinct config role (§6); it shares
    // the extraction provider, since both are "understand this text" calls.
    let arbitration_llm = extraction_llm.clone();

    let schedule = cortex_config.lifecycle.schedule.clone();
    let cortex = Arc::new(Cortex::new(
        store,
        embedder.clone(),
        arbitration_llm,
        extraction_llm,
        lifecycle_llm,
        cortex_config.clone(),
    ));

    schedule::spawn(cortex.clone(), &schedule);

    let auth_token = std::env::var("CORTEX_AUTH_TOKEN").ok().map(Arc::<str>::from);
    let state = AppState {
        cortex,
        embedder,
        auth_token,
        config: Arc::new(RwLock::new(cortex_config)),
    };

    let app = api::router()
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let port = cli.port.unwrap_or(7420);
    let addr: SocketAddr = format!("{}:{}", cli.host, port).parse()?;
    tracing::info!(%addr, "cortex-server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("cortex-server shutting down");
    Ok(())
}

fn init_logging(format: &str) {
    let filter = EnvFilter::try_from_env("CORTEX_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
