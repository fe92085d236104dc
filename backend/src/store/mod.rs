//! Storage collaborator interfaces
//!
//! The core engines never touch a concrete persistence technology; they are
//! handed these traits at construction time. The only guarantee the engines
//! rely on is `DocumentStore::update` being atomic per key
//! (single-writer-per-key), so concurrent mutations of the same field never
//! lose updates while different fields proceed in parallel.

pub mod memory;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use shared::models::{HarvestPrediction, RainReport, SensorReading, SoilMoistureReport};

use crate::error::{AppError, AppResult};

pub use memory::{InMemoryDocumentStore, InMemorySensorStore, InMemorySignalStore};

/// Crowdsourced climate signals: rain reports per zone, soil moisture
/// reports per field, and the append-only harvest prediction log.
pub trait ClimateSignalStore: Send + Sync {
    fn record_rain_report(&self, report: RainReport) -> AppResult<()>;

    /// All rain reports for a zone reported at or after `since`
    fn rain_reports_since(&self, zone: &str, since: DateTime<Utc>)
        -> AppResult<Vec<RainReport>>;

    fn record_soil_report(&self, report: SoilMoistureReport) -> AppResult<()>;

    /// The most recent soil moisture report for a field, if any
    fn latest_soil_report(&self, field_id: &str) -> AppResult<Option<SoilMoistureReport>>;

    /// Append to the farmer's harvest prediction log
    fn append_harvest_prediction(
        &self,
        farmer_id: &str,
        prediction: &HarvestPrediction,
    ) -> AppResult<()>;
}

/// Environmental sensor readings (storage-area temperature and humidity)
pub trait SensorStore: Send + Sync {
    fn record_reading(&self, reading: SensorReading) -> AppResult<()>;

    fn latest_reading(&self, sensor_id: &str) -> AppResult<Option<SensorReading>>;
}

/// Generic keyed JSON document store used for calendars and nutrient
/// tracking records.
pub trait DocumentStore: Send + Sync {
    fn load(&self, key: &str) -> AppResult<Option<Value>>;

    fn save(&self, key: &str, document: Value) -> AppResult<()>;

    /// Atomic read-modify-write of a single key. The closure receives the
    /// current document (if any) and returns the replacement; an error
    /// aborts the update and leaves the stored document untouched.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> AppResult<Value>,
    ) -> AppResult<Value>;
}

/// Load and deserialize a typed document
pub fn load_document<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    key: &str,
) -> AppResult<Option<T>> {
    match store.load(key)? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::StorageError(e.to_string())),
        None => Ok(None),
    }
}

/// Serialize and save a typed document
pub fn save_document<T: Serialize>(
    store: &dyn DocumentStore,
    key: &str,
    document: &T,
) -> AppResult<()> {
    let value =
        serde_json::to_value(document).map_err(|e| AppError::StorageError(e.to_string()))?;
    store.save(key, value)
}
