//! Harvest forecasting models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A harvest date prediction for a planted field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestPrediction {
    pub field_id: String,
    pub crop: String,
    pub variety: String,
    pub planting_date: NaiveDate,
    pub maturity_days: u32,
    pub predicted_date: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub predicted_at: DateTime<Utc>,
}

/// Expected conditions around the harvest date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HarvestConditions {
    Dry,
    Uncertain,
    Wet,
}

/// Weather outlook for the harvest window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherOutlook {
    pub conditions: HarvestConditions,
    /// 0-1 probability of rain around harvest
    pub rain_probability: f64,
    pub advice: String,
}

/// An environmental reading from a storage-area sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub temperature_celsius: Decimal,
    pub humidity_percent: i32,
    pub recorded_at: DateTime<Utc>,
}

/// Whether the farmer's storage is fit to receive the harvest.
/// `ready` is None when no sensor data exists to judge from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageReadiness {
    pub ready: Option<bool>,
    pub temperature_celsius: Option<Decimal>,
    pub humidity_percent: Option<i32>,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Escalation level of a composed harvest alert
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// Composed harvest readiness alert. Ephemeral; computed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestAlert {
    pub prediction: HarvestPrediction,
    pub weather: WeatherOutlook,
    pub storage: StorageReadiness,
    pub alert_level: AlertLevel,
    pub action_items: Vec<String>,
}
