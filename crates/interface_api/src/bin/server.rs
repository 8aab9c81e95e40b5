//! Reimbursement tracker API server
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, development roster
//! cargo run --bin reimburse-api
//!
//! # PostgreSQL store
//! API_STORAGE=postgres API_DATABASE_URL=postgres://... cargo run --bin reimburse-api
//! ```
//!
//! # Environment Variables
//!
//! * `APP_CONFIG` - Config file path without extension (default: config/reimburse)
//! * `API_HOST` / `API_PORT` - Bind address (default: 0.0.0.0:8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_STORAGE` - `memory` or `postgres`
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level when `RUST_LOG` is unset (default: info)
//! * `API_LOG_FORMAT` - `pretty` or `json`
//! * `API_LIFECYCLE__GRACE_WINDOW_SECS` and friends - lifecycle timing

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_claims::{ClaimStore, InMemoryClaimStore, LifecycleEngine};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PgClaimStore};
use interface_api::config::{ApiConfig, LogFormat, StorageKind};
use interface_api::create_router;
use interface_api::identity::StaffDirectory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::load().context("loading configuration")?;

    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        "Starting reimbursement tracker API server"
    );

    let policy = config
        .lifecycle
        .to_policy()
        .context("invalid lifecycle settings")?;
    let directory =
        StaffDirectory::from_entries(&config.staff).context("invalid staff roster")?;
    if directory.is_empty() {
        tracing::warn!("Staff roster is empty; nobody can log in");
    }

    let store = open_store(&config).await?;
    let engine = LifecycleEngine::new(store, Arc::new(SystemClock), policy);

    let app = create_router(engine, config.clone(), Arc::new(directory));

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid bind address")?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Opens the configured claim store
async fn open_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn ClaimStore>> {
    match config.storage {
        StorageKind::Memory => {
            tracing::warn!("Using in-memory claim store; claims are lost on restart");
            Ok(Arc::new(InMemoryClaimStore::new()))
        }
        StorageKind::Postgres => {
            let pool = create_pool(DatabaseConfig::new(&config.database_url))
                .await
                .context("connecting to database")?;
            run_migrations(&pool).await.context("running migrations")?;
            Ok(Arc::new(PgClaimStore::new(pool)))
        }
    }
}

/// Initializes the tracing subscriber
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
