//! Charger Server - catalog of charging locations.
//!
//! This server mirrors the upstream location feed into PostgreSQL on a fixed
//! schedule and serves the catalog back as cursor-paginated JSON using the
//! charger-engine pagination and sync logic.
//!
//! # Commands
//!
//! - `serve` - Run the HTTP API and the background sync loop (default)
//! - `sync` - Run one sync pass and exit

mod config;
mod db;
mod error;
mod handlers;
mod metrics;
mod routes;
mod scheduler;
mod source;

use crate::config::Config;
use crate::db::PgStore;
use crate::metrics::Metrics;
use crate::scheduler::SyncStatus;
use crate::source::HttpSource;
use axum::{middleware, Router};
use charger_engine::{LocationStore, Synchronizer, SystemClock};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LocationStore>,
    pub sync_status: SyncStatus,
    pub metrics: Metrics,
}

/// Charging location catalog server.
#[derive(Parser)]
#[command(name = "charger-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Default)]
enum Command {
    /// Serve the HTTP API and sync on a schedule
    #[default]
    Serve,
    /// Run one sync pass and exit
    Sync,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "charger_server=debug,charger_engine=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    // Create database pool
    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await?;

    let metrics = Metrics::new();
    let store = Arc::new(PgStore::new(pool));
    let source =
        HttpSource::new(&config.source_url, config.source_timeout)?.with_metrics(metrics.clone());
    let synchronizer = Arc::new(Synchronizer::new(store.clone(), source, SystemClock));

    match cli.command.unwrap_or_default() {
        Command::Sync => {
            let report = synchronizer.sync().await?;
            println!("Added: {}, Updated: {}", report.added, report.updated);
            Ok(())
        }
        Command::Serve => serve(config, store, synchronizer, metrics).await,
    }
}

async fn serve(
    config: Config,
    store: Arc<PgStore>,
    synchronizer: Arc<Synchronizer<Arc<PgStore>, HttpSource, SystemClock>>,
    metrics: Metrics,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting Charger Server on {}:{}", config.host, config.port);

    // Background sync loop
    tracing::info!(
        interval_secs = config.sync_interval.as_secs(),
        source = synchronizer.source().url(),
        "Scheduling sync passes"
    );
    let sync_status = SyncStatus::default();
    scheduler::spawn(
        synchronizer,
        config.sync_interval,
        config.sync_on_start,
        sync_status.clone(),
        metrics.clone(),
    );

    // Build application state
    let state = AppState {
        store,
        sync_status,
        metrics: metrics.clone(),
    };

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(middleware::from_fn_with_state(
            metrics,
            metrics::track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
