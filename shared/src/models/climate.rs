//! Climate signal and risk models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::GpsCoordinates;

/// Crowdsourced rain intensity categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RainAmount {
    None,
    Light,
    Moderate,
    Heavy,
}

impl RainAmount {
    /// Adequacy score contributed by a single report (0 = no rain, 1 = heavy)
    pub fn score(&self) -> f64 {
        match self {
            RainAmount::None => 0.0,
            RainAmount::Light => 0.3,
            RainAmount::Moderate => 0.7,
            RainAmount::Heavy => 1.0,
        }
    }
}

/// A crowdsourced rain report. Immutable once created; only ever aggregated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainReport {
    pub id: Uuid,
    pub zone: String,
    pub coordinates: GpsCoordinates,
    pub amount: RainAmount,
    pub reported_at: DateTime<Utc>,
}

/// Categorical soil moisture as farmers self-report it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MoistureCategory {
    VeryDry,
    Dry,
    Moist,
    Wet,
    Waterlogged,
}

/// A soil moisture observation, either categorical or a direct percentage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MoistureReading {
    Category(MoistureCategory),
    Percent(u8),
}

impl MoistureReading {
    /// Normalize to the 0-100 Soil Moisture Index
    pub fn index(&self) -> f64 {
        match self {
            MoistureReading::Category(MoistureCategory::VeryDry) => 10.0,
            MoistureReading::Category(MoistureCategory::Dry) => 30.0,
            MoistureReading::Category(MoistureCategory::Moist) => 60.0,
            MoistureReading::Category(MoistureCategory::Wet) => 80.0,
            MoistureReading::Category(MoistureCategory::Waterlogged) => 95.0,
            MoistureReading::Percent(p) => (*p).min(100) as f64,
        }
    }
}

/// A farmer's soil moisture self-report for a field.
/// The latest report per field is authoritative; history is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilMoistureReport {
    pub field_id: String,
    pub moisture: MoistureReading,
    pub reported_at: DateTime<Utc>,
}

/// Classified risk level derived from the LCRS score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Threshold classification: <30 low, <60 moderate, else high
    pub fn from_score(score: f64) -> Self {
        if score < 30.0 {
            RiskLevel::Low
        } else if score < 60.0 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}

/// The individual fused factors, each on a 0-1 scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactors {
    pub rain_adequacy: f64,
    pub soil_moisture: f64,
    pub seasonal_forecast: f64,
    pub drought_risk: f64,
    pub flood_risk: f64,
}

/// Localized Climate Risk Score result.
///
/// Recomputed on every request; may be cached by callers until
/// `valid_until` but is never authoritative stored state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcrsResult {
    /// Composite score on a 0-100 scale
    pub score: f64,
    pub risk_level: RiskLevel,
    pub factors: RiskFactors,
    pub recommendations: Vec<String>,
    /// Degraded-signal provenance, e.g. "no recent rain reports"
    pub notes: Vec<String>,
    pub valid_until: DateTime<Utc>,
}
