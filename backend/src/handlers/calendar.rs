//! HTTP handlers for season calendar endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use shared::models::{CalendarRecord, CompletionStats, ScheduledPractice};

use crate::error::AppResult;
use crate::services::CalendarService;
use crate::AppState;

fn service(state: &AppState) -> CalendarService {
    CalendarService::new(state.registry.clone(), state.documents.clone())
}

/// Input for generating a season calendar
#[derive(Debug, Deserialize)]
pub struct GenerateCalendarInput {
    pub field_id: String,
    pub crop: String,
    pub variety: Option<String>,
    pub planting_date: NaiveDate,
}

/// Generate a full-season calendar for a planting event
pub async fn generate_calendar(
    State(state): State<AppState>,
    Json(input): Json<GenerateCalendarInput>,
) -> AppResult<Json<CalendarRecord>> {
    let record = service(&state).generate_season_calendar(
        &input.field_id,
        &input.crop,
        input.variety.as_deref(),
        input.planting_date,
    )?;
    Ok(Json(record))
}

/// The active calendar for a field
pub async fn get_calendar(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
) -> AppResult<Json<CalendarRecord>> {
    Ok(Json(service(&state).latest_calendar(&field_id)?))
}

/// Input for completing a practice
#[derive(Debug, Default, Deserialize)]
pub struct CompletePracticeInput {
    pub date: Option<NaiveDate>,
}

/// Mark a scheduled practice as completed
pub async fn complete_practice(
    State(state): State<AppState>,
    Path((field_id, practice_key)): Path<(String, String)>,
    Json(input): Json<CompletePracticeInput>,
) -> AppResult<Json<ScheduledPractice>> {
    let practice =
        service(&state).mark_practice_completed(&field_id, &practice_key, input.date)?;
    Ok(Json(practice))
}

/// Practice completion statistics for a field
pub async fn get_completion_rate(
    State(state): State<AppState>,
    Path(field_id): Path<String>,
) -> AppResult<Json<CompletionStats>> {
    let stats = service(&state).completion_rate(&field_id, Utc::now().date_naive())?;
    Ok(Json(stats))
}
