//! FireStock Server - PPE inventory and loan tracking
//!
//! REST API server for the fire station equipment store.

use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use firestock_server::{
    api,
    config::{AppConfig, StorageBackend},
    repository::{MemoryStore, RemoteStore, Repository},
    services::{
        vision::{GeminiClient, StockAnalyst, VisionClassifier},
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing; keep the guard alive so file logs get flushed
    let _log_guard = init_tracing(&config);

    tracing::info!("Starting FireStock Server v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn RemoteStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            // Create database connection pool
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .connect(&config.database.url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("./migrations").run(&pool).await?;

            tracing::info!("Database migrations completed");
            Arc::new(Repository::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory demo store, nothing will be persisted");
            Arc::new(MemoryStore::demo())
        }
    };

    // Vision is optional: without it /scan and /stats/insight answer 503
    let gemini = if config.vision.enabled {
        match GeminiClient::new(&config.vision) {
            Ok(client) => {
                tracing::info!("Vision service enabled ({})", config.vision.model);
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!("Vision service disabled: {}", e);
                None
            }
        }
    } else {
        None
    };
    let vision = gemini.clone().map(|c| c as Arc<dyn VisionClassifier>);
    let analyst = gemini.map(|c| c as Arc<dyn StockAnalyst>);

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    let services = Services::new(store, config.ledger.recent_limit, vision, analyst).await?;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = api::create_router(state);

    // Start server
    let addr = SocketAddr::new(server_host.parse()?, server_port);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Console output (pretty or JSON) plus an optional daily log file
fn init_tracing(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("firestock_server={},tower_http=debug", config.logging.level).into()
    });

    let console = match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().boxed(),
        _ => tracing_subscriber::fmt::layer().boxed(),
    };

    let (file, guard) = match &config.logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "firestock.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();

    guard
}
