//! Route definitions for the Shamba Advisory Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Climate risk scoring
        .nest("/climate", climate_routes())
        // Crowdsourced signal ingestion
        .nest("/signals", signal_routes())
        // Growth model queries
        .nest("/growth", growth_routes())
        // Planting advisory
        .nest("/planting", planting_routes())
        // Season calendars
        .nest("/calendars", calendar_routes())
        // Harvest forecasting
        .nest("/harvest", harvest_routes())
        // Nutrient tracking
        .nest("/nutrients", nutrient_routes())
}

/// Climate risk routes
fn climate_routes() -> Router<AppState> {
    Router::new().route("/risk", get(handlers::get_climate_risk))
}

/// Signal ingestion routes
fn signal_routes() -> Router<AppState> {
    Router::new()
        .route("/rain", post(handlers::record_rain_report))
        .route("/soil", post(handlers::record_soil_report))
        .route("/sensor", post(handlers::record_sensor_reading))
}

/// Growth model routes
fn growth_routes() -> Router<AppState> {
    Router::new()
        .route("/crops", get(handlers::list_crops))
        .route("/:crop/stage", get(handlers::get_current_stage))
        .route("/:crop/practices", get(handlers::get_upcoming_practices))
        .route("/:crop/curve", get(handlers::get_growth_curve))
}

/// Planting advisory routes
fn planting_routes() -> Router<AppState> {
    Router::new()
        .route("/advice", get(handlers::get_planting_advice))
        .route("/diversification", post(handlers::create_diversification_plan))
}

/// Season calendar routes
fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::generate_calendar))
        .route("/:field_id", get(handlers::get_calendar))
        .route("/:field_id/completion", get(handlers::get_completion_rate))
        .route(
            "/:field_id/practices/:practice_key/complete",
            post(handlers::complete_practice),
        )
}

/// Harvest forecasting routes
fn harvest_routes() -> Router<AppState> {
    Router::new()
        .route("/prediction", get(handlers::get_harvest_prediction))
        .route("/weather", get(handlers::get_harvest_weather))
        .route("/storage", get(handlers::get_storage_readiness))
        .route("/alert", post(handlers::generate_harvest_alert))
}

/// Nutrient tracking routes
fn nutrient_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::initialize_tracking))
        .route("/:field_id", get(handlers::get_tracking_record))
        .route("/:field_id/predictions", post(handlers::predict_depletion))
        .route("/:field_id/applications", post(handlers::record_application))
        .route("/:field_id/budget", get(handlers::get_budget_estimate))
}
