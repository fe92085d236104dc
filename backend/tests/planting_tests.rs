//! Planting window advisor integration tests

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use shamba_advisory_backend::config::ClimateConfig;
use shamba_advisory_backend::services::{ClimateRiskService, PlantingAdvisorService};
use shamba_advisory_backend::store::InMemorySignalStore;
use shared::models::{PlantingStatus, RiskLevel};
use shared::types::{GpsCoordinates, Location};

fn advisor() -> PlantingAdvisorService {
    let signals = Arc::new(InMemorySignalStore::new());
    PlantingAdvisorService::new(ClimateRiskService::new(signals, ClimateConfig::default()))
}

fn location() -> Location {
    Location::new(GpsCoordinates::new(Decimal::ZERO, Decimal::ZERO), "kasarani")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn advise_on(as_of: NaiveDate) -> shared::models::PlantingAdvice {
    let now = Utc
        .with_ymd_and_hms(as_of.year(), as_of.month(), 15, 12, 0, 0)
        .unwrap();
    advisor()
        .advise("maize", "field-1", &location(), None, as_of, now)
        .unwrap()
}

#[test]
fn test_planting_inside_window_is_optimal() {
    let advice = advise_on(date(2024, 3, 10));
    assert_eq!(advice.status, PlantingStatus::Optimal);
    assert_eq!(advice.window.season_name, "long rains");
    assert!(advice.days_late.is_none());
    assert!(advice.alternative_crops.is_empty());
}

#[test]
fn test_planting_before_window_is_early() {
    let advice = advise_on(date(2024, 2, 10));
    assert_eq!(advice.status, PlantingStatus::Early);
    assert_eq!(advice.days_until_start, Some(20));
    assert!(advice.recommendations[0].contains("opens in 20 days"));
}

#[test]
fn test_planting_shortly_after_window_is_late() {
    // Maize long rains window: Mar 1 + 45 days = Apr 15
    let advice = advise_on(date(2024, 4, 20));
    assert_eq!(advice.status, PlantingStatus::Late);
    assert_eq!(advice.days_late, Some(5));
    assert!(advice
        .alternative_crops
        .iter()
        .any(|c| c.contains("katumani")));
}

#[test]
fn test_planting_long_after_window_is_very_late() {
    let advice = advise_on(date(2024, 5, 20));
    assert_eq!(advice.status, PlantingStatus::VeryLate);
    assert_eq!(advice.days_late, Some(35));
    // Drought-tolerant staples are independent of the original crop
    assert_eq!(
        advice.alternative_crops,
        vec!["cassava", "sorghum", "sweet_potato"]
    );
    // A moderate seasonal outlook adds the diversification hedge
    assert!(advice
        .recommendations
        .iter()
        .any(|r| r.contains("20% of land")));
}

#[test]
fn test_intended_date_overrides_as_of() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
    let advice = advisor()
        .advise(
            "maize",
            "field-1",
            &location(),
            Some(date(2024, 3, 20)),
            date(2024, 2, 1),
            now,
        )
        .unwrap();
    assert_eq!(advice.status, PlantingStatus::Optimal);
}

#[test]
fn test_diversification_tiers() {
    let advisor = advisor();
    let area = Decimal::from(10);

    let low = advisor
        .diversification_plan("maize", area, RiskLevel::Low)
        .unwrap();
    assert_eq!(low.primary.share_percent, 90);
    assert_eq!(low.diversification.len(), 1);

    let moderate = advisor
        .diversification_plan("maize", area, RiskLevel::Moderate)
        .unwrap();
    assert_eq!(moderate.primary.share_percent, 70);
    assert_eq!(moderate.diversification.len(), 2);

    let high = advisor
        .diversification_plan("maize", area, RiskLevel::High)
        .unwrap();
    assert_eq!(high.primary.share_percent, 50);
    assert_eq!(high.primary.area_hectares, Decimal::from(5));
    assert!(high.diversification.iter().any(|c| c.crop == "cassava"));
}

#[test]
fn test_diversification_rejects_zero_area() {
    assert!(advisor()
        .diversification_plan("maize", Decimal::ZERO, RiskLevel::Low)
        .is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Allocation shares always sum to 100% and hectares to the total.
    #[test]
    fn prop_diversification_allocates_whole_field(
        area_cents in 1i64..100_000,
        risk_index in 0usize..3,
    ) {
        let area = Decimal::new(area_cents, 2);
        let risk = [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High][risk_index];

        let plan = advisor().diversification_plan("maize", area, risk).unwrap();

        let share_total: u32 = plan.primary.share_percent
            + plan.diversification.iter().map(|c| c.share_percent).sum::<u32>();
        prop_assert_eq!(share_total, 100);

        let area_total: Decimal = plan.primary.area_hectares
            + plan.diversification.iter().map(|c| c.area_hectares).sum::<Decimal>();
        prop_assert_eq!(area_total, area);
    }
}
