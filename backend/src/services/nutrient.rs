//! Nutrient depletion tracking and prediction
//!
//! Tracks per-field nutrient consumption against the crop's uptake curve
//! and the fertilizer application ledger, predicting days-until-critical
//! per nutrient. All records are append-only within a season.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use shared::models::{
    AlertUrgency, BudgetEstimate, BudgetItem, DepletionPrediction, FertilizerApplication,
    GrowthModel, Nutrient, NutrientAmounts, NutrientOutlook, NutrientStatus,
    NutrientTrackingRecord, OVERDUE_STAGE_KEY,
};
use shared::validation::{
    validate_area_hectares, validate_content_percent, validate_ppm, validate_quantity_kg,
};

use crate::error::{AppError, AppResult};
use crate::store::{load_document, save_document, DocumentStore};

use super::growth::GrowthModelRegistry;

/// Soil-test PPM to kilograms per field: ppm * 2 * hectares
const PPM_TO_KG_PER_HECTARE: Decimal = Decimal::TWO;

/// Critical threshold as a share of the season target
const CRITICAL_THRESHOLD_SHARE: Decimal = Decimal::from_parts(2, 0, 0, false, 1); // 0.2

/// Sentinel when no meaningful daily uptake rate exists
const NO_DEPLETION_SENTINEL_DAYS: i64 = 999;

fn tracking_key(field_id: &str) -> String {
    format!("nutrients:{}", field_id)
}

/// Nutrient depletion service
#[derive(Clone)]
pub struct NutrientService {
    registry: Arc<GrowthModelRegistry>,
    documents: Arc<dyn DocumentStore>,
}

impl NutrientService {
    pub fn new(registry: Arc<GrowthModelRegistry>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            registry,
            documents,
        }
    }

    /// Start tracking a field for the season. Soil-test PPM values convert
    /// to kilograms via the `ppm * 2 * hectares` field approximation, and
    /// season targets scale the crop's per-hectare uptake totals by area.
    pub fn initialize_tracking(
        &self,
        field_id: &str,
        crop: &str,
        variety: Option<&str>,
        area_hectares: Decimal,
        initial_ppm: NutrientAmounts,
        planting_date: NaiveDate,
    ) -> AppResult<NutrientTrackingRecord> {
        validate_area_hectares(area_hectares)?;
        validate_ppm(initial_ppm.nitrogen_kg)?;
        validate_ppm(initial_ppm.phosphorus_kg)?;
        validate_ppm(initial_ppm.potassium_kg)?;

        let model = self.registry.get(crop, variety)?;

        let initial_levels = initial_ppm.scaled(PPM_TO_KG_PER_HECTARE * area_hectares);
        let season_targets = model
            .nutrient_uptake
            .totals_per_hectare
            .scaled(area_hectares);

        let record = NutrientTrackingRecord {
            field_id: field_id.to_string(),
            crop: model.crop.clone(),
            variety: model.variety.clone(),
            area_hectares,
            planting_date,
            initial_levels,
            current_levels: initial_levels,
            season_targets,
            applications: Vec::new(),
            depletion_predictions: Vec::new(),
            created_at: Utc::now(),
        };

        save_document(self.documents.as_ref(), &tracking_key(field_id), &record)?;
        tracing::info!(field_id, crop = %record.crop, "initialized nutrient tracking");
        Ok(record)
    }

    /// The field's tracking record
    pub fn tracking_record(&self, field_id: &str) -> AppResult<NutrientTrackingRecord> {
        load_document(self.documents.as_ref(), &tracking_key(field_id))?.ok_or_else(|| {
            AppError::NotInitialized(format!("Nutrient tracking for field '{}'", field_id))
        })
    }

    /// Predict depletion as of a date and append the prediction to the
    /// record's history.
    pub fn predict_depletion(
        &self,
        field_id: &str,
        as_of: NaiveDate,
    ) -> AppResult<DepletionPrediction> {
        let mut result: Option<DepletionPrediction> = None;

        self.update_record(field_id, |record| {
            let model = self.registry.get(&record.crop, Some(&record.variety))?;
            let prediction = compute_depletion(self.registry.as_ref(), model, record, as_of);
            record.depletion_predictions.push(prediction.clone());
            result = Some(prediction);
            Ok(())
        })?;

        result.ok_or_else(|| AppError::Internal("prediction produced no result".to_string()))
    }

    /// Log a fertilizer application. Nutrient kilograms derive from the
    /// product's percent content, and the informational running balance
    /// (`current_levels`) is bumped immediately.
    pub fn record_application(
        &self,
        field_id: &str,
        applied_on: NaiveDate,
        product: &str,
        quantity_kg: Decimal,
        nitrogen_percent: Decimal,
        phosphorus_percent: Decimal,
        potassium_percent: Decimal,
    ) -> AppResult<FertilizerApplication> {
        validate_quantity_kg(quantity_kg)?;
        validate_content_percent(nitrogen_percent)?;
        validate_content_percent(phosphorus_percent)?;
        validate_content_percent(potassium_percent)?;

        let hundred = Decimal::from(100);
        let application = FertilizerApplication {
            applied_on,
            product: product.to_string(),
            quantity_kg,
            nutrients: NutrientAmounts::new(
                quantity_kg * nitrogen_percent / hundred,
                quantity_kg * phosphorus_percent / hundred,
                quantity_kg * potassium_percent / hundred,
            ),
        };

        let logged = application.clone();
        self.update_record(field_id, move |record| {
            record.current_levels = record.current_levels.add(&logged.nutrients);
            record.applications.push(logged.clone());
            Ok(())
        })?;

        tracing::info!(field_id, product, %quantity_kg, "recorded fertilizer application");
        Ok(application)
    }

    /// Re-run depletion and price a commercial top-up for every nutrient in
    /// warning or critical status, alongside free or cheap local
    /// alternatives.
    pub fn budget_estimate(&self, field_id: &str, as_of: NaiveDate) -> AppResult<BudgetEstimate> {
        let prediction = self.predict_depletion(field_id, as_of)?;

        let flagged = [
            (Nutrient::Nitrogen, &prediction.nitrogen),
            (Nutrient::Phosphorus, &prediction.phosphorus),
            (Nutrient::Potassium, &prediction.potassium),
        ];

        let mut items = Vec::new();
        let mut total = Decimal::ZERO;
        for (nutrient, outlook) in flagged {
            if outlook.status == NutrientStatus::Adequate {
                continue;
            }
            let (product, cost_per_bag, alternatives) = commercial_product(nutrient);
            total += cost_per_bag;
            items.push(BudgetItem {
                nutrient,
                status: outlook.status,
                product: product.to_string(),
                bag_size_kg: 50,
                cost_per_bag,
                local_alternatives: alternatives.iter().map(|a| a.to_string()).collect(),
            });
        }

        Ok(BudgetEstimate {
            field_id: field_id.to_string(),
            items,
            total_estimated_cost: total,
            currency: "KES".to_string(),
        })
    }

    /// Atomic read-modify-write of a field's tracking record
    fn update_record(
        &self,
        field_id: &str,
        mut apply: impl FnMut(&mut NutrientTrackingRecord) -> AppResult<()>,
    ) -> AppResult<()> {
        self.documents
            .update(&tracking_key(field_id), &mut |current| {
                let value = current.ok_or_else(|| {
                    AppError::NotInitialized(format!(
                        "Nutrient tracking for field '{}'",
                        field_id
                    ))
                })?;
                let mut record: NutrientTrackingRecord = serde_json::from_value(value)
                    .map_err(|e| AppError::StorageError(e.to_string()))?;
                apply(&mut record)?;
                serde_json::to_value(&record)
                    .map_err(|e| AppError::StorageError(e.to_string()))
            })
            .map(|_| ())
    }
}

/// The depletion math itself: consumption follows the stage-weighted uptake
/// curve, applications add available nutrient back, and the days-until-
/// critical projection uses the flat season-average daily rate.
fn compute_depletion(
    registry: &GrowthModelRegistry,
    model: &GrowthModel,
    record: &NutrientTrackingRecord,
    as_of: NaiveDate,
) -> DepletionPrediction {
    let stage = registry.current_stage(model, record.planting_date, as_of);
    let days_since_planting = stage.days_after_planting;

    let cumulative_uptake_percent = if stage.stage_key == OVERDUE_STAGE_KEY {
        Decimal::from(100)
    } else {
        let mut cumulative = Decimal::ZERO;
        for model_stage in &model.stages {
            cumulative += model
                .nutrient_uptake
                .stage_percentages
                .get(&model_stage.key)
                .copied()
                .unwrap_or(Decimal::ZERO);
            if model_stage.key == stage.stage_key {
                break;
            }
        }
        cumulative
    };

    let applied: NutrientAmounts = record
        .applications
        .iter()
        .fold(NutrientAmounts::ZERO, |acc, a| acc.add(&a.nutrients));

    let outlook = |nutrient: Nutrient| -> NutrientOutlook {
        let target = record.season_targets.get(nutrient);
        let consumed =
            target * cumulative_uptake_percent / Decimal::from(100) - applied.get(nutrient);
        let remaining = (record.initial_levels.get(nutrient) - consumed).max(Decimal::ZERO);
        let critical_threshold = target * CRITICAL_THRESHOLD_SHARE;

        let daily_uptake = if model.maturity_days > 0 {
            target / Decimal::from(model.maturity_days)
        } else {
            Decimal::ZERO
        };

        let days_until_critical = if daily_uptake <= Decimal::ZERO {
            NO_DEPLETION_SENTINEL_DAYS
        } else if remaining <= critical_threshold {
            0
        } else {
            ((remaining - critical_threshold) / daily_uptake)
                .floor()
                .to_i64()
                .unwrap_or(NO_DEPLETION_SENTINEL_DAYS)
        };

        let status = if days_until_critical <= 7 {
            NutrientStatus::Critical
        } else if days_until_critical <= 14 {
            NutrientStatus::Warning
        } else {
            NutrientStatus::Adequate
        };

        NutrientOutlook {
            remaining_kg: remaining,
            critical_threshold_kg: critical_threshold,
            daily_uptake_kg: daily_uptake,
            days_until_critical,
            status,
        }
    };

    let nitrogen = outlook(Nutrient::Nitrogen);
    let phosphorus = outlook(Nutrient::Phosphorus);
    let potassium = outlook(Nutrient::Potassium);

    // Nitrogen is checked first and dominates the overall urgency
    let urgency = match nitrogen.status {
        NutrientStatus::Critical => AlertUrgency::High,
        NutrientStatus::Warning => AlertUrgency::Medium,
        NutrientStatus::Adequate => {
            if phosphorus.status == NutrientStatus::Critical
                || potassium.status == NutrientStatus::Critical
            {
                AlertUrgency::Medium
            } else {
                AlertUrgency::Low
            }
        }
    };

    let mut alerts = Vec::new();
    for (name, topdress, o) in [
        ("Nitrogen", "top-dress with CAN now", &nitrogen),
        ("Phosphorus", "apply DAP or rock phosphate", &phosphorus),
        ("Potassium", "apply muriate of potash or wood ash", &potassium),
    ] {
        match o.status {
            NutrientStatus::Critical => alerts.push(format!(
                "{} reaches critical level in about {} days; {}",
                name, o.days_until_critical, topdress
            )),
            NutrientStatus::Warning => alerts.push(format!(
                "{} is trending low; plan to {} within two weeks",
                name, topdress
            )),
            NutrientStatus::Adequate => {}
        }
    }

    DepletionPrediction {
        predicted_on: as_of,
        days_since_planting,
        stage_key: stage.stage_key,
        cumulative_uptake_percent,
        nitrogen,
        phosphorus,
        potassium,
        urgency,
        alerts,
    }
}

/// Fixed commercial product table: one 50 kg bag suggestion per nutrient,
/// priced in KES, plus local alternatives with no cost attached.
fn commercial_product(nutrient: Nutrient) -> (&'static str, Decimal, &'static [&'static str]) {
    match nutrient {
        Nutrient::Nitrogen => (
            "CAN (26% N)",
            Decimal::from(3400),
            &["Composted manure", "Tithonia green manure tea"],
        ),
        Nutrient::Phosphorus => (
            "DAP (18-46-0)",
            Decimal::from(4250),
            &["Bone meal", "Rock phosphate"],
        ),
        Nutrient::Potassium => (
            "Muriate of potash (60% K2O)",
            Decimal::from(3800),
            &["Wood ash", "Banana stem mulch"],
        ),
    }
}
