//! Nutrient tracking and depletion models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The three macronutrients tracked per field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Nitrogen,
    Phosphorus,
    Potassium,
}

impl Nutrient {
    pub fn symbol(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "N",
            Nutrient::Phosphorus => "P",
            Nutrient::Potassium => "K",
        }
    }
}

/// N/P/K quantities in kilograms
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NutrientAmounts {
    pub nitrogen_kg: Decimal,
    pub phosphorus_kg: Decimal,
    pub potassium_kg: Decimal,
}

impl NutrientAmounts {
    pub const ZERO: Self = Self {
        nitrogen_kg: Decimal::ZERO,
        phosphorus_kg: Decimal::ZERO,
        potassium_kg: Decimal::ZERO,
    };

    pub fn new(nitrogen_kg: Decimal, phosphorus_kg: Decimal, potassium_kg: Decimal) -> Self {
        Self {
            nitrogen_kg,
            phosphorus_kg,
            potassium_kg,
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> Decimal {
        match nutrient {
            Nutrient::Nitrogen => self.nitrogen_kg,
            Nutrient::Phosphorus => self.phosphorus_kg,
            Nutrient::Potassium => self.potassium_kg,
        }
    }

    /// Scale all three quantities by a factor (e.g. per-hectare -> per-field)
    pub fn scaled(&self, factor: Decimal) -> Self {
        Self {
            nitrogen_kg: self.nitrogen_kg * factor,
            phosphorus_kg: self.phosphorus_kg * factor,
            potassium_kg: self.potassium_kg * factor,
        }
    }

    pub fn add(&self, other: &NutrientAmounts) -> Self {
        Self {
            nitrogen_kg: self.nitrogen_kg + other.nitrogen_kg,
            phosphorus_kg: self.phosphorus_kg + other.phosphorus_kg,
            potassium_kg: self.potassium_kg + other.potassium_kg,
        }
    }
}

/// A logged fertilizer application. Nutrient kilograms are derived from
/// the product's percent content at record time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FertilizerApplication {
    pub applied_on: NaiveDate,
    pub product: String,
    pub quantity_kg: Decimal,
    pub nutrients: NutrientAmounts,
}

/// Per-nutrient depletion status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NutrientStatus {
    Adequate,
    Warning,
    Critical,
}

/// Overall urgency of a depletion prediction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AlertUrgency {
    Low,
    Medium,
    High,
}

/// Forecast for a single nutrient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientOutlook {
    pub remaining_kg: Decimal,
    pub critical_threshold_kg: Decimal,
    pub daily_uptake_kg: Decimal,
    /// Days until the nutrient crosses its critical threshold; 0 if already
    /// below it, 999 when no meaningful uptake rate exists
    pub days_until_critical: i64,
    pub status: NutrientStatus,
}

/// One depletion prediction, appended to the tracking record's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepletionPrediction {
    pub predicted_on: NaiveDate,
    pub days_since_planting: i64,
    pub stage_key: String,
    pub cumulative_uptake_percent: Decimal,
    pub nitrogen: NutrientOutlook,
    pub phosphorus: NutrientOutlook,
    pub potassium: NutrientOutlook,
    pub urgency: AlertUrgency,
    pub alerts: Vec<String>,
}

/// Per-field nutrient tracking state, created at planting.
///
/// `initial_levels` anchors the depletion math for the whole season;
/// `current_levels` is an informational running balance bumped by each
/// application. Applications and predictions are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutrientTrackingRecord {
    pub field_id: String,
    pub crop: String,
    pub variety: String,
    pub area_hectares: Decimal,
    pub planting_date: NaiveDate,
    pub initial_levels: NutrientAmounts,
    pub current_levels: NutrientAmounts,
    pub season_targets: NutrientAmounts,
    pub applications: Vec<FertilizerApplication>,
    pub depletion_predictions: Vec<DepletionPrediction>,
    pub created_at: DateTime<Utc>,
}

/// A commercial top-up suggestion for one depleted nutrient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetItem {
    pub nutrient: Nutrient,
    pub status: NutrientStatus,
    pub product: String,
    pub bag_size_kg: u32,
    pub cost_per_bag: Decimal,
    pub local_alternatives: Vec<String>,
}

/// Budget estimate for topping up all depleted nutrients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetEstimate {
    pub field_id: String,
    pub items: Vec<BudgetItem>,
    pub total_estimated_cost: Decimal,
    pub currency: String,
}
