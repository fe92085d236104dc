//! Nutrient depletion predictor integration tests
//!
//! Works through the documented maize example: 2 ha of H614 with a modest
//! soil test, consumption following the stage-weighted uptake curve, and
//! fertilizer applications adding nutrient back into the balance.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use shamba_advisory_backend::error::AppError;
use shamba_advisory_backend::services::{GrowthModelRegistry, NutrientService};
use shamba_advisory_backend::store::InMemoryDocumentStore;
use shared::models::{AlertUrgency, Nutrient, NutrientAmounts, NutrientStatus};

fn service() -> NutrientService {
    let registry = Arc::new(GrowthModelRegistry::builtin().unwrap());
    NutrientService::new(registry, Arc::new(InMemoryDocumentStore::new()))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn planted() -> NaiveDate {
    date(2024, 3, 1)
}

/// 2 ha maize H614 with soil tests N 40 / P 20 / K 30 ppm
fn initialized(service: &NutrientService) {
    service
        .initialize_tracking(
            "field-1",
            "maize",
            None,
            Decimal::from(2),
            NutrientAmounts::new(Decimal::from(40), Decimal::from(20), Decimal::from(30)),
            planted(),
        )
        .unwrap();
}

#[test]
fn test_initialization_converts_ppm_and_scales_targets() {
    let service = service();
    let record = service
        .initialize_tracking(
            "field-1",
            "maize",
            None,
            Decimal::from(2),
            NutrientAmounts::new(Decimal::from(40), Decimal::from(20), Decimal::from(30)),
            planted(),
        )
        .unwrap();

    // ppm * 2 * hectares
    assert_eq!(record.initial_levels.nitrogen_kg, Decimal::from(160));
    assert_eq!(record.initial_levels.phosphorus_kg, Decimal::from(80));
    assert_eq!(record.initial_levels.potassium_kg, Decimal::from(120));
    assert_eq!(record.current_levels, record.initial_levels);

    // Per-hectare totals (120/50/100) scaled by 2 ha
    assert_eq!(record.season_targets.nitrogen_kg, Decimal::from(240));
    assert_eq!(record.season_targets.phosphorus_kg, Decimal::from(100));
    assert_eq!(record.season_targets.potassium_kg, Decimal::from(200));
}

#[test]
fn test_initialization_validates_inputs() {
    let service = service();

    let err = service
        .initialize_tracking(
            "field-1",
            "maize",
            None,
            Decimal::ZERO,
            NutrientAmounts::new(Decimal::from(40), Decimal::from(20), Decimal::from(30)),
            planted(),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = service
        .initialize_tracking(
            "field-1",
            "teff",
            None,
            Decimal::from(2),
            NutrientAmounts::new(Decimal::from(40), Decimal::from(20), Decimal::from(30)),
            planted(),
        )
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

/// Day 30 sits in the vegetative stage: 40% cumulative uptake. Worked
/// through the curve, nitrogen lands in warning and potassium is already
/// at its critical threshold, while nitrogen still dominates the urgency.
#[test]
fn test_depletion_math_at_day_30() {
    let service = service();
    initialized(&service);

    let prediction = service
        .predict_depletion("field-1", planted() + Duration::days(30))
        .unwrap();

    assert_eq!(prediction.days_since_planting, 30);
    assert_eq!(prediction.stage_key, "vegetative");
    assert_eq!(prediction.cumulative_uptake_percent, Decimal::from(40));

    // N: 160 initial - 96 consumed = 64 left, threshold 48, 2 kg/day
    assert_eq!(prediction.nitrogen.remaining_kg, Decimal::from(64));
    assert_eq!(prediction.nitrogen.critical_threshold_kg, Decimal::from(48));
    assert_eq!(prediction.nitrogen.days_until_critical, 8);
    assert_eq!(prediction.nitrogen.status, NutrientStatus::Warning);

    // K: 120 initial - 80 consumed = 40 left, exactly at its threshold
    assert_eq!(prediction.potassium.remaining_kg, Decimal::from(40));
    assert_eq!(prediction.potassium.days_until_critical, 0);
    assert_eq!(prediction.potassium.status, NutrientStatus::Critical);

    assert_eq!(prediction.phosphorus.status, NutrientStatus::Adequate);

    // Nitrogen is checked first and dominates urgency
    assert_eq!(prediction.urgency, AlertUrgency::Medium);
    assert!(prediction.alerts.iter().any(|a| a.contains("Nitrogen")));
    assert!(prediction.alerts.iter().any(|a| a.contains("Potassium")));
}

#[test]
fn test_past_maturity_consumes_full_curve() {
    let service = service();
    initialized(&service);

    let prediction = service
        .predict_depletion("field-1", planted() + Duration::days(150))
        .unwrap();

    assert_eq!(prediction.cumulative_uptake_percent, Decimal::from(100));
    // 160 initial - 240 consumed clamps at zero rather than going negative
    assert_eq!(prediction.nitrogen.remaining_kg, Decimal::ZERO);
    assert_eq!(prediction.nitrogen.days_until_critical, 0);
}

/// Applying 50 kg of CAN (26% N) adds back exactly 13 kg of nitrogen, to
/// both the running balance and the next depletion prediction.
#[test]
fn test_application_round_trip() {
    let service = service();
    initialized(&service);

    let as_of = planted() + Duration::days(30);
    let before = service.predict_depletion("field-1", as_of).unwrap();

    let application = service
        .record_application(
            "field-1",
            planted() + Duration::days(28),
            "CAN",
            Decimal::from(50),
            Decimal::from(26),
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap();
    assert_eq!(application.nutrients.nitrogen_kg, Decimal::from(13));

    let record = service.tracking_record("field-1").unwrap();
    assert_eq!(
        record.current_levels.nitrogen_kg,
        record.initial_levels.nitrogen_kg + Decimal::from(13)
    );

    let after = service.predict_depletion("field-1", as_of).unwrap();
    assert_eq!(
        after.nitrogen.remaining_kg - before.nitrogen.remaining_kg,
        Decimal::from(13)
    );
}

#[test]
fn test_predictions_append_to_history() {
    let service = service();
    initialized(&service);

    service
        .predict_depletion("field-1", planted() + Duration::days(20))
        .unwrap();
    service
        .predict_depletion("field-1", planted() + Duration::days(40))
        .unwrap();

    let record = service.tracking_record("field-1").unwrap();
    assert_eq!(record.depletion_predictions.len(), 2);
    assert_eq!(record.depletion_predictions[0].days_since_planting, 20);
    assert_eq!(record.depletion_predictions[1].days_since_planting, 40);
}

#[test]
fn test_uninitialized_field_is_rejected() {
    let service = service();

    let err = service
        .predict_depletion("field-9", planted())
        .unwrap_err();
    assert!(matches!(err, AppError::NotInitialized(_)));

    let err = service
        .record_application(
            "field-9",
            planted(),
            "CAN",
            Decimal::from(50),
            Decimal::from(26),
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap_err();
    assert!(matches!(err, AppError::NotInitialized(_)));

    let err = service.budget_estimate("field-9", planted()).unwrap_err();
    assert!(matches!(err, AppError::NotInitialized(_)));
}

#[test]
fn test_application_validation() {
    let service = service();
    initialized(&service);

    let err = service
        .record_application(
            "field-1",
            planted(),
            "CAN",
            Decimal::ZERO,
            Decimal::from(26),
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let err = service
        .record_application(
            "field-1",
            planted(),
            "CAN",
            Decimal::from(50),
            Decimal::from(120),
            Decimal::ZERO,
            Decimal::ZERO,
        )
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

/// At day 30 nitrogen is in warning and potassium critical, so the budget
/// prices CAN and muriate of potash but skips phosphorus.
#[test]
fn test_budget_prices_flagged_nutrients() {
    let service = service();
    initialized(&service);

    let budget = service
        .budget_estimate("field-1", planted() + Duration::days(30))
        .unwrap();

    assert_eq!(budget.items.len(), 2);
    assert!(budget
        .items
        .iter()
        .any(|i| i.nutrient == Nutrient::Nitrogen && i.product.contains("CAN")));
    assert!(budget
        .items
        .iter()
        .any(|i| i.nutrient == Nutrient::Potassium && i.product.contains("potash")));
    assert!(budget.items.iter().all(|i| !i.local_alternatives.is_empty()));
    assert_eq!(budget.total_estimated_cost, Decimal::from(7200));
    assert_eq!(budget.currency, "KES");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Remaining levels never go negative and days-until-critical is never
    /// negative, whatever the date and application history.
    #[test]
    fn prop_depletion_outputs_stay_clamped(
        days in 0i64..200,
        applications in prop::collection::vec((1i64..200, 0i64..60), 0..4),
    ) {
        let service = service();
        initialized(&service);

        for (quantity, offset) in applications {
            service
                .record_application(
                    "field-1",
                    planted() + Duration::days(offset),
                    "CAN",
                    Decimal::from(quantity),
                    Decimal::from(26),
                    Decimal::ZERO,
                    Decimal::ZERO,
                )
                .unwrap();
        }

        let prediction = service
            .predict_depletion("field-1", planted() + Duration::days(days))
            .unwrap();

        for outlook in [&prediction.nitrogen, &prediction.phosphorus, &prediction.potassium] {
            prop_assert!(outlook.remaining_kg >= Decimal::ZERO);
            prop_assert!(outlook.days_until_critical >= 0);
            prop_assert!(outlook.days_until_critical <= 999);
        }
    }
}
