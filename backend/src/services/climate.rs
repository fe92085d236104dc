//! Localized Climate Risk Score (LCRS) fusion engine
//!
//! Fuses crowdsourced rain reports, soil-moisture self-reports and seasonal
//! climatology into a single 0-100 risk score. A missing signal source never
//! fails the computation; the affected factor degrades to a neutral 0.5 and
//! the result carries a note explaining the gap.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};

use shared::models::{LcrsResult, RiskFactors, RiskLevel};
use shared::types::Location;
use shared::validation::validate_horizon_months;

use crate::config::ClimateConfig;
use crate::error::AppResult;
use crate::store::ClimateSignalStore;

/// Neutral factor substituted when a signal source has no data
pub const NEUTRAL_FACTOR: f64 = 0.5;

/// Soil saturation above which flood risk starts tracking rainfall
const FLOOD_SATURATION_THRESHOLD: f64 = 0.7;

/// Flood risk floor applied below the saturation threshold
const FLOOD_RISK_FLOOR: f64 = 0.1;

/// Month-indexed (Jan..Dec) seasonal drought risk for the bimodal rainfall
/// regime: long rains Mar-May and short rains Oct-Nov sit low, the dry
/// seasons high.
const SEASONAL_RISK_BY_MONTH: [f64; 12] = [
    0.80, 0.75, 0.40, 0.20, 0.30, 0.55, 0.70, 0.70, 0.60, 0.30, 0.25, 0.55,
];

/// Seasonal drought risk for a calendar month (1-12)
pub fn seasonal_risk_for_month(month: u32) -> f64 {
    SEASONAL_RISK_BY_MONTH[((month.max(1) - 1) % 12) as usize]
}

/// Mean seasonal risk over `horizon_months` starting at `start_month`
pub fn seasonal_average(start_month: u32, horizon_months: u32) -> f64 {
    let months = horizon_months.max(1);
    let total: f64 = (0..months)
        .map(|offset| seasonal_risk_for_month((start_month - 1 + offset) % 12 + 1))
        .sum();
    total / months as f64
}

/// Risk fusion engine
#[derive(Clone)]
pub struct ClimateRiskService {
    signals: Arc<dyn ClimateSignalStore>,
    config: ClimateConfig,
}

impl ClimateRiskService {
    pub fn new(signals: Arc<dyn ClimateSignalStore>, config: ClimateConfig) -> Self {
        Self { signals, config }
    }

    /// Compute the LCRS for a field at its location.
    ///
    /// `horizon_months` bounds the seasonal outlook and the validity of the
    /// returned score.
    pub fn assess(
        &self,
        field_id: &str,
        location: &Location,
        horizon_months: u32,
        now: DateTime<Utc>,
    ) -> AppResult<LcrsResult> {
        validate_horizon_months(horizon_months)?;

        let mut notes = Vec::new();

        let rain_adequacy = match self.rain_adequacy(&location.zone, now)? {
            Some(factor) => factor,
            None => {
                notes.push("No recent rain reports for this zone; assuming neutral rainfall".to_string());
                NEUTRAL_FACTOR
            }
        };

        let soil_index = self.soil_moisture_index(field_id)?;
        let soil_moisture = match soil_index {
            Some(index) => self.soil_moisture_factor(index),
            None => {
                notes.push("No soil moisture report for this field; assuming neutral moisture".to_string());
                NEUTRAL_FACTOR
            }
        };

        let seasonal_forecast = seasonal_average(now.month(), horizon_months);

        let drought_risk = 0.3 * (1.0 - rain_adequacy)
            + 0.3 * (1.0 - soil_moisture)
            + 0.4 * seasonal_forecast;

        // Piecewise flood model: below the saturation threshold the flood
        // term is a flat floor regardless of rainfall.
        let saturation = soil_index.map(|index| index / 100.0);
        let flood_risk = match saturation {
            Some(s) if s > FLOOD_SATURATION_THRESHOLD => 0.5 * rain_adequacy + 0.5 * s,
            _ => FLOOD_RISK_FLOOR,
        };

        let score = (100.0
            * (0.6 * drought_risk + 0.2 * flood_risk + 0.2 * seasonal_forecast))
            .clamp(0.0, 100.0);
        let risk_level = RiskLevel::from_score(score);

        let mut recommendations = Vec::new();
        if drought_risk > 0.6 {
            recommendations
                .push("Plant a drought-tolerant variety this season".to_string());
            recommendations.push(
                "Conserve soil moisture with mulching and tied ridges".to_string(),
            );
        }
        if flood_risk > 0.6 {
            recommendations.push(
                "Prepare drainage channels or raised beds before the rains peak".to_string(),
            );
        }
        if soil_moisture < 0.4 {
            recommendations.push(
                "Soil moisture is far from optimum; check irrigation and drainage".to_string(),
            );
        }
        if score > 60.0 {
            recommendations.push(
                "Allocate at least 20% of land to a drought-tolerant crop such as sorghum or cassava"
                    .to_string(),
            );
        }

        tracing::debug!(
            field_id,
            zone = %location.zone,
            score,
            ?risk_level,
            "computed climate risk score"
        );

        Ok(LcrsResult {
            score,
            risk_level,
            factors: RiskFactors {
                rain_adequacy,
                soil_moisture,
                seasonal_forecast,
                drought_risk,
                flood_risk,
            },
            recommendations,
            notes,
            valid_until: now + Duration::days(horizon_months as i64 * 30),
        })
    }

    /// Rain adequacy (0 = drought, 1 = adequate) from crowdsourced reports
    /// in the configured window, weighted by linear time decay with a 0.1
    /// floor so stale reports keep a small voice. Neutral when no reports
    /// exist.
    pub fn rain_adequacy_factor(&self, zone: &str, now: DateTime<Utc>) -> AppResult<f64> {
        Ok(self.rain_adequacy(zone, now)?.unwrap_or(NEUTRAL_FACTOR))
    }

    fn rain_adequacy(&self, zone: &str, now: DateTime<Utc>) -> AppResult<Option<f64>> {
        let window_days = self.config.rain_window_days.max(1);
        let since = now - Duration::days(window_days);
        let reports = self.signals.rain_reports_since(zone, since)?;

        if reports.is_empty() {
            return Ok(None);
        }

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for report in &reports {
            let days_ago = (now - report.reported_at).num_seconds() as f64 / 86_400.0;
            let weight = (1.0 - days_ago / window_days as f64).max(0.1);
            weighted_sum += weight * report.amount.score();
            weight_total += weight;
        }

        Ok(Some(weighted_sum / weight_total))
    }

    /// Latest soil moisture report normalized to the 0-100 index
    fn soil_moisture_index(&self, field_id: &str) -> AppResult<Option<f64>> {
        Ok(self
            .signals
            .latest_soil_report(field_id)?
            .map(|report| report.moisture.index()))
    }

    /// Distance-from-optimum factor: 1.0 at the agronomic optimum, falling
    /// linearly toward 0 at either extreme.
    fn soil_moisture_factor(&self, index: f64) -> f64 {
        let optimum = self.config.soil_optimum_index;
        (1.0 - (index - optimum).abs() / optimum).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use uuid::Uuid;

    use shared::models::{MoistureReading, RainAmount, RainReport, SoilMoistureReport};
    use shared::types::GpsCoordinates;

    use crate::store::{ClimateSignalStore, InMemorySignalStore};

    use super::*;

    fn service(signals: Arc<InMemorySignalStore>) -> ClimateRiskService {
        ClimateRiskService::new(signals, ClimateConfig::default())
    }

    fn location() -> Location {
        Location::new(
            GpsCoordinates::new(Decimal::new(-1287, 3), Decimal::new(36817, 3)),
            "kasarani",
        )
    }

    fn rain_report(zone: &str, amount: RainAmount, reported_at: DateTime<Utc>) -> RainReport {
        RainReport {
            id: Uuid::new_v4(),
            zone: zone.to_string(),
            coordinates: GpsCoordinates::new(Decimal::ZERO, Decimal::ZERO),
            amount,
            reported_at,
        }
    }

    #[test]
    fn test_no_signals_degrades_to_neutral() {
        let signals = Arc::new(InMemorySignalStore::new());
        let result = service(signals)
            .assess("field-1", &location(), 3, Utc::now())
            .unwrap();

        assert_eq!(result.factors.rain_adequacy, NEUTRAL_FACTOR);
        assert_eq!(result.factors.soil_moisture, NEUTRAL_FACTOR);
        assert_eq!(result.notes.len(), 2);
    }

    #[test]
    fn test_flood_risk_floor_below_saturation_threshold() {
        let signals = Arc::new(InMemorySignalStore::new());
        let now = Utc::now();

        signals
            .record_rain_report(rain_report("kasarani", RainAmount::Heavy, now))
            .unwrap();
        signals
            .record_soil_report(SoilMoistureReport {
                field_id: "field-1".to_string(),
                moisture: MoistureReading::Percent(69),
                reported_at: now,
            })
            .unwrap();

        let result = service(signals.clone())
            .assess("field-1", &location(), 3, now)
            .unwrap();
        assert_eq!(result.factors.flood_risk, FLOOD_RISK_FLOOR);

        // One point past the threshold the rain term switches on
        signals
            .record_soil_report(SoilMoistureReport {
                field_id: "field-1".to_string(),
                moisture: MoistureReading::Percent(71),
                reported_at: now + Duration::seconds(1),
            })
            .unwrap();

        let result = service(signals)
            .assess("field-1", &location(), 3, now + Duration::seconds(2))
            .unwrap();
        assert!(result.factors.flood_risk > 0.8);
    }

    #[test]
    fn test_seasonal_table_is_bimodal() {
        // Long rains and short rains months sit below the dry-season peaks
        assert!(seasonal_risk_for_month(4) < seasonal_risk_for_month(1));
        assert!(seasonal_risk_for_month(10) < seasonal_risk_for_month(8));
        assert!((0.0..=1.0).contains(&seasonal_average(1, 12)));
    }

    #[test]
    fn test_horizon_is_validated() {
        let signals = Arc::new(InMemorySignalStore::new());
        assert!(service(signals)
            .assess("field-1", &location(), 0, Utc::now())
            .is_err());
    }
}
