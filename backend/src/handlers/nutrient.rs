//! HTTP handlers for nutrient tracking endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use shared::models::{
    BudgetEstimate, DepletionPrediction, FertilizerApplication, NutrientAmounts,
    NutrientTrackingRecord,
};

use crate::error::AppResult;
use crate::services::NutrientService;
use crate::AppState;

fn service(state: &AppState) -> NutrientService {
    NutrientService::new(state.registry.clone(), state.documents.clone())
}

/// Input for initializing nutrient tracking
#[derive(Debug, Deserialize)]
pub struct InitializeTrackingInput {
    pub field_id: String,
    pub crop: String,
    pub variety: Option<String>,
    pub area_hectares: Decimal,
    pub nitrogen_ppm: Decimal,
    pub phosphorus_ppm: Decimal,
    pub potassium_ppm: Decimal,
    pub planting_date: NaiveDate,
}

/// Initialize nutrient tracking for a field at planting
pub async fn initialize_tracking(
    State(state): State<AppState>,
    Json(input): Json<InitializeTrackingInput>,
) -> AppResult<Json<NutrientTrackingRecord>> {
    let record = service(&state).initialize_tracking(
        &input.field_id,
        &input.crop,
        input.variety.as_deref(),
        input.area_hectares,
        NutrientAmounts::new(input.nitrogen_ppm, input.phosphorus_ppm, input.potassium_ppm),
        input.planting_date,
    )?;
    Ok(Json(record))
}

/// The field's nutrient tracking record
pub async fn get_tracking_record(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
) -> AppResult<Json<NutrientTrackingRecord>> {
    Ok(Json(service(&state).tracking_record(&field_id)?))
}

/// Input for a depletion prediction
#[derive(Debug, Default, Deserialize)]
pub struct PredictDepletionInput {
    pub as_of: Option<NaiveDate>,
}

/// Predict nutrient depletion for a field
pub async fn predict_depletion(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
    Json(input): Json<PredictDepletionInput>,
) -> AppResult<Json<DepletionPrediction>> {
    let as_of = input.as_of.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(service(&state).predict_depletion(&field_id, as_of)?))
}

/// Input for recording a fertilizer application
#[derive(Debug, Deserialize)]
pub struct RecordApplicationInput {
    pub applied_on: Option<NaiveDate>,
    pub product: String,
    pub quantity_kg: Decimal,
    pub nitrogen_percent: Decimal,
    pub phosphorus_percent: Decimal,
    pub potassium_percent: Decimal,
}

/// Log a fertilizer application against a field
pub async fn record_application(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
    Json(input): Json<RecordApplicationInput>,
) -> AppResult<Json<FertilizerApplication>> {
    let applied_on = input.applied_on.unwrap_or_else(|| Utc::now().date_naive());
    let application = service(&state).record_application(
        &field_id,
        applied_on,
        &input.product,
        input.quantity_kg,
        input.nitrogen_percent,
        input.phosphorus_percent,
        input.potassium_percent,
    )?;
    Ok(Json(application))
}

/// Query parameters for a budget estimate
#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    pub as_of: Option<NaiveDate>,
}

/// Estimate the cost of topping up depleted nutrients
pub async fn get_budget_estimate(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
    Query(query): Query<BudgetQuery>,
) -> AppResult<Json<BudgetEstimate>> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    Ok(Json(service(&state).budget_estimate(&field_id, as_of)?))
}
