//! HTTP handlers for growth model queries

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use shared::models::{GrowthCurvePoint, StageInfo, UpcomingPractice};

use crate::error::AppResult;
use crate::AppState;

/// List the crops with registered growth models
pub async fn list_crops(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.crops())
}

/// Query parameters for the current growth stage
#[derive(Debug, Deserialize)]
pub struct StageQuery {
    pub planting_date: NaiveDate,
    pub variety: Option<String>,
    pub as_of: Option<NaiveDate>,
}

/// Current growth stage of a planted crop
pub async fn get_current_stage(
    State(state): State<AppState>,
    Path(crop): Path<String>,
    Query(query): Query<StageQuery>,
) -> AppResult<Json<StageInfo>> {
    let model = state.registry.get(&crop, query.variety.as_deref())?;
    let today = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(state.registry.current_stage(model, query.planting_date, today)))
}

/// Query parameters for upcoming practices
#[derive(Debug, Deserialize)]
pub struct PracticesQuery {
    pub planting_date: NaiveDate,
    pub variety: Option<String>,
    pub as_of: Option<NaiveDate>,
    pub lookahead_days: Option<i64>,
}

/// Upcoming critical practices for a planted crop
pub async fn get_upcoming_practices(
    State(state): State<AppState>,
    Path(crop): Path<String>,
    Query(query): Query<PracticesQuery>,
) -> AppResult<Json<Vec<UpcomingPractice>>> {
    let model = state.registry.get(&crop, query.variety.as_deref())?;
    let today = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let lookahead = query.lookahead_days.unwrap_or(14);
    Ok(Json(state.registry.upcoming_practices(
        model,
        query.planting_date,
        today,
        lookahead,
    )))
}

/// Query parameters for the reference growth curve
#[derive(Debug, Deserialize)]
pub struct CurveQuery {
    pub variety: Option<String>,
}

/// Weekly expected-health reference curve for a crop
pub async fn get_growth_curve(
    State(state): State<AppState>,
    Path(crop): Path<String>,
    Query(query): Query<CurveQuery>,
) -> AppResult<Json<Vec<GrowthCurvePoint>>> {
    let model = state.registry.get(&crop, query.variety.as_deref())?;
    Ok(Json(state.registry.optimal_growth_curve(model)))
}
