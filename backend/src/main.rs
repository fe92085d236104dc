//! Shamba Advisory Platform - Backend Server
//!
//! Serves climate risk scores, planting advice, season calendars, harvest
//! forecasts and nutrient depletion predictions to the farmer-facing apps.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shamba_advisory_backend::services::GrowthModelRegistry;
use shamba_advisory_backend::store::{
    InMemoryDocumentStore, InMemorySensorStore, InMemorySignalStore,
};
use shamba_advisory_backend::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shamba_advisory_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Shamba Advisory Server");
    tracing::info!("Environment: {}", config.environment);

    // Load and validate the growth model registry; malformed reference
    // data must stop the server before it can hand out advice.
    let registry = Arc::new(GrowthModelRegistry::builtin()?);
    tracing::info!("Growth models loaded for: {}", registry.crops().join(", "));

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        registry,
        signals: Arc::new(InMemorySignalStore::new()),
        sensors: Arc::new(InMemorySensorStore::new()),
        documents: Arc::new(InMemoryDocumentStore::new()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
