//! In-memory store implementations
//!
//! Used by the server by default and by the test suites. The document store
//! keeps one mutex per key under an outer registry lock, so read-modify-write
//! cycles for the same field serialize while unrelated fields never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde_json::Value;

use shared::models::{HarvestPrediction, RainReport, SensorReading, SoilMoistureReport};

use crate::error::{AppError, AppResult};

use super::{ClimateSignalStore, DocumentStore, SensorStore};

fn poisoned() -> AppError {
    AppError::StorageError("store lock poisoned".to_string())
}

/// In-memory climate signal store
#[derive(Default)]
pub struct InMemorySignalStore {
    rain: RwLock<HashMap<String, Vec<RainReport>>>,
    soil: RwLock<HashMap<String, Vec<SoilMoistureReport>>>,
    predictions: RwLock<HashMap<String, Vec<HarvestPrediction>>>,
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All logged harvest predictions for a farmer, oldest first
    pub fn harvest_predictions(&self, farmer_id: &str) -> AppResult<Vec<HarvestPrediction>> {
        let predictions = self.predictions.read().map_err(|_| poisoned())?;
        Ok(predictions.get(farmer_id).cloned().unwrap_or_default())
    }
}

impl ClimateSignalStore for InMemorySignalStore {
    fn record_rain_report(&self, report: RainReport) -> AppResult<()> {
        let mut rain = self.rain.write().map_err(|_| poisoned())?;
        rain.entry(report.zone.clone()).or_default().push(report);
        Ok(())
    }

    fn rain_reports_since(
        &self,
        zone: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<RainReport>> {
        let rain = self.rain.read().map_err(|_| poisoned())?;
        Ok(rain
            .get(zone)
            .map(|reports| {
                reports
                    .iter()
                    .filter(|r| r.reported_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn record_soil_report(&self, report: SoilMoistureReport) -> AppResult<()> {
        let mut soil = self.soil.write().map_err(|_| poisoned())?;
        soil.entry(report.field_id.clone()).or_default().push(report);
        Ok(())
    }

    fn latest_soil_report(&self, field_id: &str) -> AppResult<Option<SoilMoistureReport>> {
        let soil = self.soil.read().map_err(|_| poisoned())?;
        Ok(soil
            .get(field_id)
            .and_then(|reports| reports.iter().max_by_key(|r| r.reported_at))
            .cloned())
    }

    fn append_harvest_prediction(
        &self,
        farmer_id: &str,
        prediction: &HarvestPrediction,
    ) -> AppResult<()> {
        let mut predictions = self.predictions.write().map_err(|_| poisoned())?;
        predictions
            .entry(farmer_id.to_string())
            .or_default()
            .push(prediction.clone());
        Ok(())
    }
}

/// In-memory environmental sensor store
#[derive(Default)]
pub struct InMemorySensorStore {
    readings: RwLock<HashMap<String, Vec<SensorReading>>>,
}

impl InMemorySensorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorStore for InMemorySensorStore {
    fn record_reading(&self, reading: SensorReading) -> AppResult<()> {
        let mut readings = self.readings.write().map_err(|_| poisoned())?;
        readings
            .entry(reading.sensor_id.clone())
            .or_default()
            .push(reading);
        Ok(())
    }

    fn latest_reading(&self, sensor_id: &str) -> AppResult<Option<SensorReading>> {
        let readings = self.readings.read().map_err(|_| poisoned())?;
        Ok(readings
            .get(sensor_id)
            .and_then(|r| r.iter().max_by_key(|reading| reading.recorded_at))
            .cloned())
    }
}

/// In-memory keyed document store with per-key mutexes
#[derive(Default)]
pub struct InMemoryDocumentStore {
    entries: RwLock<HashMap<String, Arc<Mutex<Option<Value>>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key: &str) -> AppResult<Arc<Mutex<Option<Value>>>> {
        {
            let entries = self.entries.read().map_err(|_| poisoned())?;
            if let Some(entry) = entries.get(key) {
                return Ok(entry.clone());
            }
        }
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self, key: &str) -> AppResult<Option<Value>> {
        let entry = self.entry(key)?;
        let guard = entry.lock().map_err(|_| poisoned())?;
        Ok(guard.clone())
    }

    fn save(&self, key: &str, document: Value) -> AppResult<()> {
        let entry = self.entry(key)?;
        let mut guard = entry.lock().map_err(|_| poisoned())?;
        *guard = Some(document);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<Value>) -> AppResult<Value>,
    ) -> AppResult<Value> {
        let entry = self.entry(key)?;
        let mut guard = entry.lock().map_err(|_| poisoned())?;
        let updated = apply(guard.clone())?;
        *guard = Some(updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_update_is_read_modify_write() {
        let store = InMemoryDocumentStore::new();
        store.save("field:1", json!({ "count": 1 })).unwrap();

        let updated = store
            .update("field:1", &mut |current| {
                let count = current
                    .and_then(|v| v.get("count").and_then(Value::as_i64))
                    .unwrap_or(0);
                Ok(json!({ "count": count + 1 }))
            })
            .unwrap();

        assert_eq!(updated["count"], 2);
        assert_eq!(store.load("field:1").unwrap().unwrap()["count"], 2);
    }

    #[test]
    fn test_document_update_error_leaves_document_untouched() {
        let store = InMemoryDocumentStore::new();
        store.save("field:1", json!({ "count": 1 })).unwrap();

        let result = store.update("field:1", &mut |_| {
            Err(AppError::InvalidInput("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(store.load("field:1").unwrap().unwrap()["count"], 1);
    }

    #[test]
    fn test_latest_soil_report_by_timestamp() {
        use chrono::Duration;
        use shared::models::{MoistureCategory, MoistureReading};

        let store = InMemorySignalStore::new();
        let now = Utc::now();

        store
            .record_soil_report(SoilMoistureReport {
                field_id: "f1".to_string(),
                moisture: MoistureReading::Category(MoistureCategory::Dry),
                reported_at: now,
            })
            .unwrap();
        store
            .record_soil_report(SoilMoistureReport {
                field_id: "f1".to_string(),
                moisture: MoistureReading::Percent(70),
                reported_at: now - Duration::days(2),
            })
            .unwrap();

        let latest = store.latest_soil_report("f1").unwrap().unwrap();
        assert_eq!(latest.moisture, MoistureReading::Category(MoistureCategory::Dry));
    }
}
