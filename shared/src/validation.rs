//! Validation utilities for the Shamba Advisory Platform
//!
//! Growth model invariants are enforced here at registry load time so the
//! advisory engines can assume well-formed reference data.

use rust_decimal::Decimal;

use crate::models::{GrowthModel, MoistureReading};

/// Days past maturity a critical practice may still be anchored at
/// (post-harvest actions such as drying checks).
pub const PRACTICE_GRACE_DAYS: u32 = 14;

// ============================================================================
// Growth Model Validations
// ============================================================================

/// Validate a growth model's structural invariants:
/// stage ranges contiguous and non-overlapping from day 0 to maturity,
/// uptake percentages keyed by every stage and summing to exactly 100,
/// every practice offset within [0, maturity + grace].
pub fn validate_growth_model(model: &GrowthModel) -> Result<(), &'static str> {
    if model.maturity_days == 0 {
        return Err("Maturity must be at least one day");
    }
    validate_stage_ranges(model)?;
    validate_uptake_percentages(model)?;
    validate_practice_offsets(model)?;
    Ok(())
}

/// Stage ranges must start at day 0, be contiguous (each stage starts the
/// day after the previous one ends), and end exactly at maturity.
pub fn validate_stage_ranges(model: &GrowthModel) -> Result<(), &'static str> {
    let stages = &model.stages;
    if stages.is_empty() {
        return Err("Growth model must have at least one stage");
    }
    if stages[0].start_day != 0 {
        return Err("First stage must start at day 0");
    }
    for stage in stages {
        if stage.end_day < stage.start_day {
            return Err("Stage end day must not precede its start day");
        }
    }
    for pair in stages.windows(2) {
        if pair[1].start_day != pair[0].end_day + 1 {
            return Err("Stage ranges must be contiguous and non-overlapping");
        }
    }
    if stages[stages.len() - 1].end_day != model.maturity_days {
        return Err("Last stage must end at maturity");
    }
    Ok(())
}

/// Every stage must have an uptake percentage and they must sum to 100.
pub fn validate_uptake_percentages(model: &GrowthModel) -> Result<(), &'static str> {
    let percentages = &model.nutrient_uptake.stage_percentages;
    let mut total = Decimal::ZERO;
    for stage in &model.stages {
        match percentages.get(&stage.key) {
            Some(p) if *p >= Decimal::ZERO => total += *p,
            Some(_) => return Err("Stage uptake percentages cannot be negative"),
            None => return Err("Every stage must have an uptake percentage"),
        }
    }
    if percentages.len() != model.stages.len() {
        return Err("Uptake percentages must not reference unknown stages");
    }
    if total != Decimal::from(100) {
        return Err("Stage uptake percentages must sum to 100");
    }
    Ok(())
}

/// Practice offsets must lie within [0, maturity_days + grace].
pub fn validate_practice_offsets(model: &GrowthModel) -> Result<(), &'static str> {
    let limit = model.maturity_days + PRACTICE_GRACE_DAYS;
    for practice in &model.critical_practices {
        if practice.day_offset > limit {
            return Err("Practice offset exceeds maturity plus grace period");
        }
    }
    Ok(())
}

// ============================================================================
// Input Validations
// ============================================================================

/// Validate a field area in hectares is strictly positive
pub fn validate_area_hectares(area: Decimal) -> Result<(), &'static str> {
    if area <= Decimal::ZERO {
        return Err("Area must be greater than zero hectares");
    }
    Ok(())
}

/// Validate a soil-test PPM value is non-negative
pub fn validate_ppm(ppm: Decimal) -> Result<(), &'static str> {
    if ppm < Decimal::ZERO {
        return Err("Soil test PPM cannot be negative");
    }
    Ok(())
}

/// Validate a fertilizer quantity in kilograms is strictly positive
pub fn validate_quantity_kg(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero kilograms");
    }
    Ok(())
}

/// Validate a nutrient content percentage lies in [0, 100]
pub fn validate_content_percent(percent: Decimal) -> Result<(), &'static str> {
    if percent < Decimal::ZERO || percent > Decimal::from(100) {
        return Err("Nutrient content must be between 0 and 100 percent");
    }
    Ok(())
}

/// Validate a soil moisture reading (percent readings must be 0-100)
pub fn validate_moisture_reading(reading: &MoistureReading) -> Result<(), &'static str> {
    match reading {
        MoistureReading::Percent(p) if *p > 100 => {
            Err("Soil moisture percent must be between 0 and 100")
        }
        _ => Ok(()),
    }
}

/// Validate a forecast horizon in months (1-12)
pub fn validate_horizon_months(months: u32) -> Result<(), &'static str> {
    if months == 0 || months > 12 {
        return Err("Forecast horizon must be between 1 and 12 months");
    }
    Ok(())
}
