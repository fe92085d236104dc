//! Planting window and diversification models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::climate::RiskLevel;

/// A named seasonal planting window for a crop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantingWindow {
    pub season_name: String,
    /// 1-12
    pub start_month: u32,
    pub duration_days: u32,
}

/// A planting window materialized to concrete dates for its coming
/// occurrence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedWindow {
    pub season_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// How a planting date relates to the recommended window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlantingStatus {
    Optimal,
    Early,
    Late,
    VeryLate,
}

/// Advisory result for a planting decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantingAdvice {
    pub crop: String,
    pub status: PlantingStatus,
    pub window: ComputedWindow,
    /// Days until the window opens, when early
    pub days_until_start: Option<i64>,
    /// Days past the window end, when late
    pub days_late: Option<i64>,
    pub alternative_crops: Vec<String>,
    pub recommendations: Vec<String>,
}

/// A crop's share of a diversified field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropAllocation {
    pub crop: String,
    pub area_hectares: Decimal,
    pub share_percent: u32,
    pub rationale: String,
}

/// Risk-tiered land allocation across the primary crop and hedges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiversificationPlan {
    pub total_area_hectares: Decimal,
    pub risk_level: RiskLevel,
    pub primary: CropAllocation,
    pub diversification: Vec<CropAllocation>,
}
