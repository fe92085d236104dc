//! Crop growth model reference data
//!
//! Growth models are static per-crop/variety tables created at deploy time
//! and never mutated at runtime. All offsets are in days after planting
//! (DAP).

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::nutrient::NutrientAmounts;

/// A named, contiguous DAP interval within a crop's maturity cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthStage {
    pub key: String,
    pub name: String,
    pub start_day: u32,
    pub end_day: u32,
}

/// Priority of a scheduled farm practice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PracticePriority {
    High,
    Medium,
    Low,
}

/// A critical farm practice anchored to a DAP offset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalPractice {
    pub key: String,
    pub name: String,
    pub day_offset: u32,
    pub priority: PracticePriority,
}

/// Per-stage breakdown of a crop's total-season nutrient consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientUptake {
    /// Whole-season totals for one hectare
    pub totals_per_hectare: NutrientAmounts,
    /// stage key -> percent of season total consumed during that stage;
    /// must sum to exactly 100 across all stages
    pub stage_percentages: HashMap<String, Decimal>,
}

/// Static growth model for one crop variety
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthModel {
    pub crop: String,
    pub variety: String,
    pub maturity_days: u32,
    /// Ordered, contiguous, non-overlapping stage ranges covering
    /// [0, maturity_days]
    pub stages: Vec<GrowthStage>,
    pub critical_practices: Vec<CriticalPractice>,
    pub nutrient_uptake: NutrientUptake,
}

/// Stage key reported once a crop is past its maturity window
pub const OVERDUE_STAGE_KEY: &str = "overdue";

/// The growth stage a field is currently in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageInfo {
    pub stage_key: String,
    pub stage_name: String,
    pub start_day: u32,
    pub end_day: u32,
    pub days_after_planting: i64,
    /// Progress through the current stage, 0-100
    pub progress_percent: f64,
    /// True for the synthetic terminal stage past maturity
    pub overdue: bool,
}

/// How soon an upcoming practice is due
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    Overdue,
    DueToday,
    DueSoon,
    Upcoming,
}

/// A critical practice projected onto the calendar of a planted field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingPractice {
    pub key: String,
    pub name: String,
    pub priority: PracticePriority,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub status: DueStatus,
}

/// One weekly sample of the expected-health reference curve (0-10 scale)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthCurvePoint {
    pub day: u32,
    pub expected_score: f64,
}
