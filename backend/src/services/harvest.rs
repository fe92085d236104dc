//! Harvest forecasting and readiness alerts
//!
//! Predicts harvest timing from a static maturity table, reads the harvest
//! window's weather outlook off the seasonal climatology plus crowdsourced
//! rain, checks storage-area sensor readings, and composes the three into a
//! single escalating alert.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use shared::models::{
    AlertLevel, HarvestAlert, HarvestConditions, HarvestPrediction, StorageReadiness,
    WeatherOutlook,
};
use shared::types::Location;

use crate::error::AppResult;
use crate::store::{ClimateSignalStore, SensorStore};

use super::climate::{seasonal_risk_for_month, ClimateRiskService};

/// Fallback maturity when neither crop nor variety is in the table
const GLOBAL_DEFAULT_MATURITY_DAYS: u32 = 120;

/// Half-width of the harvest window around the predicted date
const HARVEST_WINDOW_DAYS: i64 = 7;

/// Safe storage temperature band in degrees Celsius
const STORAGE_TEMP_RANGE: (i64, i64) = (5, 30);

/// Safe storage relative humidity band in percent
const STORAGE_HUMIDITY_RANGE: (i32, i32) = (40, 75);

/// Harvest forecasting service
#[derive(Clone)]
pub struct HarvestService {
    climate: ClimateRiskService,
    signals: Arc<dyn ClimateSignalStore>,
    sensors: Arc<dyn SensorStore>,
}

impl HarvestService {
    pub fn new(
        climate: ClimateRiskService,
        signals: Arc<dyn ClimateSignalStore>,
        sensors: Arc<dyn SensorStore>,
    ) -> Self {
        Self {
            climate,
            signals,
            sensors,
        }
    }

    /// Predict the harvest date and window for a planted field
    pub fn predict_harvest_date(
        &self,
        field_id: &str,
        crop: &str,
        variety: Option<&str>,
        planting_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> HarvestPrediction {
        let maturity_days = maturity_days(crop, variety);
        let predicted_date = planting_date + Duration::days(maturity_days as i64);

        HarvestPrediction {
            field_id: field_id.to_string(),
            crop: crop.to_lowercase(),
            variety: variety
                .map(|v| v.to_lowercase())
                .unwrap_or_else(|| "default".to_string()),
            planting_date,
            maturity_days,
            predicted_date,
            window_start: predicted_date - Duration::days(HARVEST_WINDOW_DAYS),
            window_end: predicted_date + Duration::days(HARVEST_WINDOW_DAYS),
            predicted_at: now,
        }
    }

    /// Weather outlook for a harvest date, fusing the seasonal forecast for
    /// the harvest month with the zone's recent crowdsourced rain factor.
    pub fn check_harvest_weather(
        &self,
        harvest_date: NaiveDate,
        zone: &str,
        now: DateTime<Utc>,
    ) -> AppResult<WeatherOutlook> {
        let forecast_risk = seasonal_risk_for_month(harvest_date.month());
        let rain_factor = self.climate.rain_adequacy_factor(zone, now)?;

        let (conditions, rain_probability, advice) =
            if forecast_risk < 0.3 && rain_factor < 0.4 {
                (
                    HarvestConditions::Dry,
                    0.2,
                    "Conditions look dry; harvest on the predicted date and sun-dry in the open",
                )
            } else if forecast_risk > 0.6 || rain_factor > 0.7 {
                (
                    HarvestConditions::Wet,
                    0.8,
                    "Rain is likely around harvest; prepare covered drying space and start at the early edge of the window",
                )
            } else {
                (
                    HarvestConditions::Uncertain,
                    0.5,
                    "Forecast is mixed; watch the zone's rain reports daily as the window approaches",
                )
            };

        Ok(WeatherOutlook {
            conditions,
            rain_probability,
            advice: advice.to_string(),
        })
    }

    /// Check whether the farmer's storage is fit to receive the harvest.
    ///
    /// Without a sensor reading the verdict is unknown (`ready: None`)
    /// rather than a failure; the issue list explains the gap.
    pub fn check_storage_readiness(
        &self,
        farmer_id: &str,
        sensor_id: Option<&str>,
    ) -> AppResult<StorageReadiness> {
        let sensor_id = sensor_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}-store", farmer_id));

        let Some(reading) = self.sensors.latest_reading(&sensor_id)? else {
            return Ok(StorageReadiness {
                ready: None,
                temperature_celsius: None,
                humidity_percent: None,
                issues: vec!["No sensor data for the storage area".to_string()],
                recommendations: vec![
                    "Install or reconnect the storage sensor before harvest".to_string(),
                ],
            });
        };

        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        let (temp_min, temp_max) = STORAGE_TEMP_RANGE;
        if reading.temperature_celsius > Decimal::from(temp_max) {
            issues.push(format!(
                "Storage temperature {}°C is above the safe range ({}-{}°C)",
                reading.temperature_celsius, temp_min, temp_max
            ));
            recommendations
                .push("Ventilate or shade the store to bring the temperature down".to_string());
        } else if reading.temperature_celsius < Decimal::from(temp_min) {
            issues.push(format!(
                "Storage temperature {}°C is below the safe range ({}-{}°C)",
                reading.temperature_celsius, temp_min, temp_max
            ));
            recommendations.push("Insulate the store against cold nights".to_string());
        }

        let (humidity_min, humidity_max) = STORAGE_HUMIDITY_RANGE;
        if reading.humidity_percent > humidity_max {
            issues.push(format!(
                "Storage humidity {}% is above the safe range ({}-{}%)",
                reading.humidity_percent, humidity_min, humidity_max
            ));
            recommendations.push(
                "Improve airflow and dry the store fully before loading produce".to_string(),
            );
        } else if reading.humidity_percent < humidity_min {
            issues.push(format!(
                "Storage humidity {}% is below the safe range ({}-{}%)",
                reading.humidity_percent, humidity_min, humidity_max
            ));
            recommendations
                .push("Low humidity is safe for grain; monitor for over-drying".to_string());
        }

        Ok(StorageReadiness {
            ready: Some(issues.is_empty()),
            temperature_celsius: Some(reading.temperature_celsius),
            humidity_percent: Some(reading.humidity_percent),
            issues,
            recommendations,
        })
    }

    /// Compose prediction, weather outlook and storage readiness into one
    /// alert. Wet weather escalates to warning; storage not ready escalates
    /// to critical regardless of weather. The prediction is logged to the
    /// farmer's append-only history as a side effect.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_harvest_alert(
        &self,
        farmer_id: &str,
        field_id: &str,
        crop: &str,
        variety: Option<&str>,
        planting_date: NaiveDate,
        location: &Location,
        sensor_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<HarvestAlert> {
        let prediction = self.predict_harvest_date(field_id, crop, variety, planting_date, now);
        let weather =
            self.check_harvest_weather(prediction.predicted_date, &location.zone, now)?;
        let storage = self.check_storage_readiness(farmer_id, sensor_id)?;

        let mut alert_level = AlertLevel::Info;
        let mut action_items = Vec::new();

        if weather.conditions == HarvestConditions::Wet {
            alert_level = AlertLevel::Warning;
            action_items.push(format!(
                "Arrange covered drying space before {}",
                prediction.window_start
            ));
        }

        match storage.ready {
            Some(false) => {
                // Storage failure dominates the weather outlook
                alert_level = AlertLevel::Critical;
                action_items.extend(storage.recommendations.iter().cloned());
            }
            None => {
                action_items.push(
                    "Confirm storage conditions manually; no sensor data is available".to_string(),
                );
            }
            Some(true) => {}
        }

        self.signals.append_harvest_prediction(farmer_id, &prediction)?;

        tracing::info!(
            farmer_id,
            field_id,
            ?alert_level,
            harvest_date = %prediction.predicted_date,
            "generated harvest alert"
        );

        Ok(HarvestAlert {
            prediction,
            weather,
            storage,
            alert_level,
            action_items,
        })
    }
}

/// Static maturity table: variety first, then the crop default, then the
/// global default.
fn maturity_days(crop: &str, variety: Option<&str>) -> u32 {
    let crop_key = crop.to_lowercase();
    let variety_key = variety.map(str::to_lowercase);

    if let Some(variety_key) = &variety_key {
        let known = match (crop_key.as_str(), variety_key.as_str()) {
            ("maize", "h614") => Some(120),
            ("maize", "dk8031") => Some(90),
            ("maize", "katumani") => Some(100),
            ("beans", "rose_coco") => Some(85),
            ("beans", "mwitemania") => Some(75),
            ("sorghum", "gadam") => Some(110),
            ("cassava", "kme_1") => Some(300),
            _ => None,
        };
        if let Some(days) = known {
            return days;
        }
    }

    match crop_key.as_str() {
        "maize" => 120,
        "beans" => 85,
        "sorghum" => 110,
        "cassava" => 300,
        "green_grams" => 65,
        "cowpeas" => 70,
        _ => GLOBAL_DEFAULT_MATURITY_DAYS,
    }
}
