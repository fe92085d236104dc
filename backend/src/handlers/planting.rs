//! HTTP handlers for planting advisory endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use shared::models::{DiversificationPlan, PlantingAdvice, RiskLevel};
use shared::types::{GpsCoordinates, Location};

use crate::error::{AppError, AppResult};
use crate::services::{ClimateRiskService, PlantingAdvisorService};
use crate::AppState;

fn advisor(state: &AppState) -> PlantingAdvisorService {
    PlantingAdvisorService::new(ClimateRiskService::new(
        state.signals.clone(),
        state.config.climate.clone(),
    ))
}

/// Query parameters for planting advice
#[derive(Debug, Deserialize)]
pub struct PlantingAdviceQuery {
    pub crop: String,
    pub field_id: String,
    pub zone: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    /// Actual or intended planting date; defaults to the as-of date
    pub planting_date: Option<NaiveDate>,
    pub as_of: Option<NaiveDate>,
}

/// Classify planting timing and recommend alternatives
pub async fn get_planting_advice(
    State(state): State<AppState>,
    Query(query): Query<PlantingAdviceQuery>,
) -> AppResult<Json<PlantingAdvice>> {
    let location = Location::new(
        GpsCoordinates::new(
            query.latitude.unwrap_or_default(),
            query.longitude.unwrap_or_default(),
        ),
        query.zone,
    );
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let advice = advisor(&state).advise(
        &query.crop,
        &query.field_id,
        &location,
        query.planting_date,
        as_of,
        Utc::now(),
    )?;
    Ok(Json(advice))
}

/// Input for a diversification plan
#[derive(Debug, Deserialize)]
pub struct DiversificationInput {
    pub primary_crop: String,
    pub total_area_hectares: Decimal,
    pub risk_level: RiskLevel,
}

/// Split a field across the primary crop and risk hedges
pub async fn create_diversification_plan(
    State(state): State<AppState>,
    Json(input): Json<DiversificationInput>,
) -> AppResult<Json<DiversificationPlan>> {
    if input.total_area_hectares <= Decimal::ZERO {
        return Err(AppError::Validation {
            field: "total_area_hectares".to_string(),
            message: "Total area must be greater than zero hectares".to_string(),
            message_sw: "Eneo la shamba lazima liwe zaidi ya sifuri".to_string(),
        });
    }

    let plan = advisor(&state).diversification_plan(
        &input.primary_crop,
        input.total_area_hectares,
        input.risk_level,
    )?;
    Ok(Json(plan))
}
