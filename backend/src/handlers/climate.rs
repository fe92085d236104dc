//! HTTP handlers for climate risk endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;

use shared::models::LcrsResult;
use shared::types::{GpsCoordinates, Location};

use crate::error::AppResult;
use crate::services::ClimateRiskService;
use crate::AppState;

/// Query parameters for a climate risk assessment
#[derive(Debug, Deserialize)]
pub struct RiskQuery {
    pub field_id: String,
    pub zone: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub horizon_months: Option<u32>,
}

/// Compute the Localized Climate Risk Score for a field
pub async fn get_climate_risk(
    State(state): State<AppState>,
    Query(query): Query<RiskQuery>,
) -> AppResult<Json<LcrsResult>> {
    let service = ClimateRiskService::new(state.signals.clone(), state.config.climate.clone());

    let location = Location::new(
        GpsCoordinates::new(
            query.latitude.unwrap_or_default(),
            query.longitude.unwrap_or_default(),
        ),
        query.zone,
    );
    let horizon = query
        .horizon_months
        .unwrap_or(state.config.climate.default_horizon_months);

    let result = service.assess(&query.field_id, &location, horizon, Utc::now())?;
    Ok(Json(result))
}
