//! Shamba Advisory Platform - Backend
//!
//! Climate-risk scoring and adaptive farm calendars for smallholder
//! farmers: fuses crowdsourced rain and soil reports with seasonal
//! climatology, schedules crop practices against growth models, and
//! forecasts harvest timing and nutrient depletion.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::GrowthModelRegistry;
use store::{ClimateSignalStore, DocumentStore, SensorStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<GrowthModelRegistry>,
    pub signals: Arc<dyn ClimateSignalStore>,
    pub sensors: Arc<dyn SensorStore>,
    pub documents: Arc<dyn DocumentStore>,
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Shamba Advisory Platform API v1.0"
}
