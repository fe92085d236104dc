//! HTTP handlers for harvest forecasting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use shared::models::{HarvestAlert, HarvestPrediction, StorageReadiness, WeatherOutlook};
use shared::types::{GpsCoordinates, Location};

use crate::error::AppResult;
use crate::services::{ClimateRiskService, HarvestService};
use crate::AppState;

fn service(state: &AppState) -> HarvestService {
    HarvestService::new(
        ClimateRiskService::new(state.signals.clone(), state.config.climate.clone()),
        state.signals.clone(),
        state.sensors.clone(),
    )
}

/// Query parameters for a harvest prediction
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    pub field_id: String,
    pub crop: String,
    pub variety: Option<String>,
    pub planting_date: NaiveDate,
}

/// Predict the harvest date and window for a planted field
pub async fn get_harvest_prediction(
    State(state): State<AppState>,
    Query(query): Query<PredictionQuery>,
) -> Json<HarvestPrediction> {
    Json(service(&state).predict_harvest_date(
        &query.field_id,
        &query.crop,
        query.variety.as_deref(),
        query.planting_date,
        Utc::now(),
    ))
}

/// Query parameters for the harvest weather outlook
#[derive(Debug, Deserialize)]
pub struct HarvestWeatherQuery {
    pub harvest_date: NaiveDate,
    pub zone: String,
}

/// Weather outlook for a harvest date
pub async fn get_harvest_weather(
    State(state): State<AppState>,
    Query(query): Query<HarvestWeatherQuery>,
) -> AppResult<Json<WeatherOutlook>> {
    let outlook =
        service(&state).check_harvest_weather(query.harvest_date, &query.zone, Utc::now())?;
    Ok(Json(outlook))
}

/// Query parameters for storage readiness
#[derive(Debug, Deserialize)]
pub struct StorageQuery {
    pub farmer_id: String,
    pub sensor_id: Option<String>,
}

/// Check storage readiness from the latest sensor reading
pub async fn get_storage_readiness(
    State(state): State<AppState>,
    Query(query): Query<StorageQuery>,
) -> AppResult<Json<StorageReadiness>> {
    let readiness =
        service(&state).check_storage_readiness(&query.farmer_id, query.sensor_id.as_deref())?;
    Ok(Json(readiness))
}

/// Input for composing a harvest alert
#[derive(Debug, Deserialize)]
pub struct HarvestAlertInput {
    pub farmer_id: String,
    pub field_id: String,
    pub crop: String,
    pub variety: Option<String>,
    pub planting_date: NaiveDate,
    pub zone: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub sensor_id: Option<String>,
}

/// Compose the full harvest readiness alert
pub async fn generate_harvest_alert(
    State(state): State<AppState>,
    Json(input): Json<HarvestAlertInput>,
) -> AppResult<Json<HarvestAlert>> {
    let location = Location::new(
        GpsCoordinates::new(
            input.latitude.unwrap_or_default(),
            input.longitude.unwrap_or_default(),
        ),
        input.zone,
    );

    let alert = service(&state).generate_harvest_alert(
        &input.farmer_id,
        &input.field_id,
        &input.crop,
        input.variety.as_deref(),
        input.planting_date,
        &location,
        input.sensor_id.as_deref(),
        Utc::now(),
    )?;
    Ok(Json(alert))
}
