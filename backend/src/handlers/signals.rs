//! HTTP handlers for climate signal ingestion

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use shared::models::{MoistureReading, RainAmount, RainReport, SensorReading, SoilMoistureReport};
use shared::types::GpsCoordinates;
use shared::validation::validate_moisture_reading;

use crate::error::AppResult;
use crate::AppState;

/// Input for a crowdsourced rain report
#[derive(Debug, Deserialize)]
pub struct RecordRainInput {
    pub zone: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub amount: RainAmount,
    pub reported_at: Option<DateTime<Utc>>,
}

/// Record a crowdsourced rain report
pub async fn record_rain_report(
    State(state): State<AppState>,
    Json(input): Json<RecordRainInput>,
) -> AppResult<Json<RainReport>> {
    let report = RainReport {
        id: Uuid::new_v4(),
        zone: input.zone,
        coordinates: GpsCoordinates::new(
            input.latitude.unwrap_or_default(),
            input.longitude.unwrap_or_default(),
        ),
        amount: input.amount,
        reported_at: input.reported_at.unwrap_or_else(Utc::now),
    };

    state.signals.record_rain_report(report.clone())?;
    Ok(Json(report))
}

/// Input for a soil moisture self-report
#[derive(Debug, Deserialize)]
pub struct RecordSoilInput {
    pub field_id: String,
    pub moisture: MoistureReading,
    pub reported_at: Option<DateTime<Utc>>,
}

/// Record a farmer's soil moisture self-report
pub async fn record_soil_report(
    State(state): State<AppState>,
    Json(input): Json<RecordSoilInput>,
) -> AppResult<Json<SoilMoistureReport>> {
    validate_moisture_reading(&input.moisture)?;

    let report = SoilMoistureReport {
        field_id: input.field_id,
        moisture: input.moisture,
        reported_at: input.reported_at.unwrap_or_else(Utc::now),
    };

    state.signals.record_soil_report(report.clone())?;
    Ok(Json(report))
}

/// Input for a storage-area sensor reading
#[derive(Debug, Deserialize)]
pub struct RecordSensorInput {
    pub sensor_id: String,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Record an environmental sensor reading
pub async fn record_sensor_reading(
    State(state): State<AppState>,
    Json(input): Json<RecordSensorInput>,
) -> AppResult<Json<SensorReading>> {
    let reading = SensorReading {
        sensor_id: input.sensor_id,
        temperature_celsius: input.temperature_celsius,
        humidity_percent: input.humidity_percent,
        recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
    };

    state.sensors.record_reading(reading.clone())?;
    Ok(Json(reading))
}
