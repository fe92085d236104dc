//! Planting window advisor
//!
//! Classifies a planting decision against the crop's seasonal windows and
//! recommends diversification when the climate risk engine flags elevated
//! risk.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use shared::models::{
    ComputedWindow, CropAllocation, DiversificationPlan, PlantingAdvice, PlantingStatus,
    PlantingWindow, RiskLevel,
};
use shared::types::Location;
use shared::validation::validate_area_hectares;

use crate::error::{AppError, AppResult};

use super::climate::ClimateRiskService;

/// Late by more than this many days tips the advice into `very_late`
const VERY_LATE_THRESHOLD_DAYS: i64 = 30;

/// Staples suggested once a window is missed badly, regardless of the
/// original crop
const DROUGHT_TOLERANT_STAPLES: [&str; 3] = ["cassava", "sorghum", "sweet_potato"];

/// Planting window advisor
#[derive(Clone)]
pub struct PlantingAdvisorService {
    climate: ClimateRiskService,
}

impl PlantingAdvisorService {
    pub fn new(climate: ClimateRiskService) -> Self {
        Self { climate }
    }

    /// Advise on planting timing for a crop at a location.
    ///
    /// `planting_date` is the actual or intended date; when absent the
    /// as-of date stands in for "planting today".
    pub fn advise(
        &self,
        crop: &str,
        field_id: &str,
        location: &Location,
        planting_date: Option<NaiveDate>,
        as_of: NaiveDate,
        now: DateTime<Utc>,
    ) -> AppResult<PlantingAdvice> {
        let window = nearest_window(crop, as_of)?;
        let comparison_date = planting_date.unwrap_or(as_of);

        let mut alternative_crops = Vec::new();
        let mut recommendations = Vec::new();

        let (status, days_until_start, days_late) = if comparison_date < window.start_date {
            let days = (window.start_date - comparison_date).num_days();
            recommendations.push(format!(
                "The {} window opens in {} days; prepare land and seed now",
                window.season_name, days
            ));
            (PlantingStatus::Early, Some(days), None)
        } else if comparison_date <= window.end_date {
            recommendations.push(format!(
                "Planting now falls inside the {} window",
                window.season_name
            ));
            (PlantingStatus::Optimal, None, None)
        } else {
            let days = (comparison_date - window.end_date).num_days();
            if days > VERY_LATE_THRESHOLD_DAYS {
                alternative_crops = DROUGHT_TOLERANT_STAPLES
                    .iter()
                    .map(|c| c.to_string())
                    .collect();
                recommendations.push(format!(
                    "The {} window closed {} days ago; switch to a drought-tolerant staple",
                    window.season_name, days
                ));
                (PlantingStatus::VeryLate, None, Some(days))
            } else {
                alternative_crops = fast_maturing_alternatives(crop);
                recommendations.push(format!(
                    "The {} window closed {} days ago; plant a fast-maturing variety immediately",
                    window.season_name, days
                ));
                (PlantingStatus::Late, None, Some(days))
            }
        };

        // A late start in a risky season deserves an explicit hedge.
        if matches!(status, PlantingStatus::Late | PlantingStatus::VeryLate) {
            let risk = self.climate.assess(field_id, location, 3, now)?;
            if matches!(risk.risk_level, RiskLevel::Moderate | RiskLevel::High) {
                recommendations.push(
                    "Climate risk is elevated; hedge by putting 20% of land under a drought-tolerant crop"
                        .to_string(),
                );
            }
        }

        Ok(PlantingAdvice {
            crop: crop.to_lowercase(),
            status,
            window,
            days_until_start,
            days_late,
            alternative_crops,
            recommendations,
        })
    }

    /// Split a field between the primary crop and risk hedges using fixed
    /// allocation tiers per risk level.
    pub fn diversification_plan(
        &self,
        primary_crop: &str,
        total_area_hectares: Decimal,
        risk_level: RiskLevel,
    ) -> AppResult<DiversificationPlan> {
        validate_area_hectares(total_area_hectares)?;

        let (primary_share, hedges): (u32, &[(&str, u32, &str)]) = match risk_level {
            RiskLevel::Low => (
                90,
                &[("green_grams", 10, "Short-cycle legume for quick income and nitrogen fixation")],
            ),
            RiskLevel::Moderate => (
                70,
                &[
                    ("sorghum", 20, "Drought-tolerant cereal hedge"),
                    ("green_grams", 10, "Short-cycle legume for quick income and nitrogen fixation"),
                ],
            ),
            RiskLevel::High => (
                50,
                &[
                    ("sorghum", 30, "Drought-tolerant cereal hedge"),
                    ("cassava", 20, "Famine-reserve root crop that survives failed rains"),
                ],
            ),
        };

        let hundred = Decimal::from(100);
        let allocation = |crop: &str, share: u32, rationale: &str| CropAllocation {
            crop: crop.to_string(),
            area_hectares: total_area_hectares * Decimal::from(share) / hundred,
            share_percent: share,
            rationale: rationale.to_string(),
        };

        Ok(DiversificationPlan {
            total_area_hectares,
            risk_level,
            primary: allocation(
                &primary_crop.to_lowercase(),
                primary_share,
                "Main season crop",
            ),
            diversification: hedges
                .iter()
                .map(|(crop, share, rationale)| allocation(crop, *share, rationale))
                .collect(),
        })
    }
}

/// Seasonal planting windows per crop. Unknown crops get the generic
/// bimodal-season defaults rather than failing; the advisor is useful even
/// for crops without a full growth model.
fn crop_windows(crop: &str) -> Vec<PlantingWindow> {
    let window = |season_name: &str, start_month: u32, duration_days: u32| PlantingWindow {
        season_name: season_name.to_string(),
        start_month,
        duration_days,
    };

    match crop.to_lowercase().as_str() {
        "maize" => vec![
            window("long rains", 3, 45),
            window("short rains", 10, 30),
        ],
        "cassava" => vec![
            window("long rains", 3, 60),
            window("short rains", 10, 45),
        ],
        // Beans, sorghum and the remaining short-cycle crops share the
        // standard month-long windows
        _ => vec![
            window("long rains", 3, 30),
            window("short rains", 10, 30),
        ],
    }
}

/// Pick the crop's window whose start month is nearest to the as-of month
/// (circular over 12 months) and materialize the occurrence on that side.
fn nearest_window(crop: &str, as_of: NaiveDate) -> AppResult<ComputedWindow> {
    let windows = crop_windows(crop);
    let as_of_month = as_of.month();

    let mut best: Option<(u32, i32, &PlantingWindow)> = None;
    for window in &windows {
        let forward = (window.start_month + 12 - as_of_month) % 12;
        let backward = (as_of_month + 12 - window.start_month) % 12;
        let (distance, month_shift) = if forward <= backward {
            (forward, forward as i32)
        } else {
            (backward, -(backward as i32))
        };
        if best.map(|(d, _, _)| distance < d).unwrap_or(true) {
            best = Some((distance, month_shift, window));
        }
    }

    let (_, month_shift, window) = best
        .ok_or_else(|| AppError::Internal("no planting windows defined".to_string()))?;

    let start_date = shift_to_month_start(as_of, month_shift)?;
    Ok(ComputedWindow {
        season_name: window.season_name.clone(),
        start_date,
        end_date: start_date + Duration::days(window.duration_days as i64),
    })
}

/// First day of the month `shift` months away from the as-of date
fn shift_to_month_start(as_of: NaiveDate, shift: i32) -> AppResult<NaiveDate> {
    let total = as_of.year() * 12 + as_of.month0() as i32 + shift;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Internal("invalid planting window date".to_string()))
}

/// Fast-maturing alternatives for a late start, keyed by the original crop
fn fast_maturing_alternatives(crop: &str) -> Vec<String> {
    let alternatives: &[&str] = match crop.to_lowercase().as_str() {
        "maize" => &["katumani maize", "beans", "cowpeas"],
        "beans" => &["cowpeas", "green_grams"],
        "sorghum" => &["green_grams", "cowpeas"],
        _ => &["beans", "cowpeas", "green_grams"],
    };
    alternatives.iter().map(|c| c.to_string()).collect()
}
