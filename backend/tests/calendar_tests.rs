//! Season calendar integration tests
//!
//! Exercises calendar generation and the practice completion state machine
//! over the in-memory document store.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use shamba_advisory_backend::error::AppError;
use shamba_advisory_backend::services::{CalendarService, GrowthModelRegistry};
use shamba_advisory_backend::store::InMemoryDocumentStore;
use shared::models::{PracticeStatus, PrecipitationRisk};

fn service() -> CalendarService {
    let registry = Arc::new(GrowthModelRegistry::builtin().unwrap());
    CalendarService::new(registry, Arc::new(InMemoryDocumentStore::new()))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_generated_calendar_projects_model_onto_dates() {
    let service = service();
    let planted = date(2024, 3, 1);
    let record = service
        .generate_season_calendar("field-1", "maize", None, planted)
        .unwrap();

    assert_eq!(record.crop, "maize");
    assert_eq!(record.variety, "h614");
    assert_eq!(record.maturity_days, 120);

    // Stage windows start at planting and stay contiguous
    assert_eq!(record.stages[0].start_date, planted);
    for pair in record.stages.windows(2) {
        assert_eq!(pair[1].start_date, pair[0].end_date + Duration::days(1));
    }
    assert_eq!(
        record.stages.last().unwrap().end_date,
        planted + Duration::days(120)
    );

    // Every practice starts pending on its offset date
    assert!(record
        .practices
        .iter()
        .all(|p| p.status == PracticeStatus::Pending && p.completed_date.is_none()));
    let weeding = record.practice("first_weeding").unwrap();
    assert_eq!(weeding.due_date, planted + Duration::days(21));

    // Harvest window brackets planting + maturity by a week each side
    let harvest = planted + Duration::days(120);
    assert_eq!(record.harvest_window.harvest_date, harvest);
    assert_eq!(record.harvest_window.window_start, harvest - Duration::days(7));
    assert_eq!(record.harvest_window.window_end, harvest + Duration::days(7));
    assert!(!record.harvest_window.tips.is_empty());

    // Weekly photo prompts from day 7 through maturity
    assert_eq!(record.photo_schedule[0].day, 7);
    assert_eq!(record.photo_schedule.len(), 17);
    assert!(record.photo_schedule.iter().all(|p| p.day <= 120));
}

#[test]
fn test_harvest_in_rains_carries_high_risk_tips() {
    let service = service();
    // Beans planted mid-January mature mid-April, inside the long rains
    let record = service
        .generate_season_calendar("field-1", "beans", None, date(2024, 1, 15))
        .unwrap();

    assert_eq!(
        record.harvest_window.precipitation_risk,
        PrecipitationRisk::High
    );
    assert!(record
        .harvest_window
        .tips
        .iter()
        .any(|t| t.contains("drying")));
}

#[test]
fn test_unknown_crop_is_rejected() {
    let err = service()
        .generate_season_calendar("field-1", "teff", None, date(2024, 3, 1))
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_latest_calendar_follows_replanting() {
    let service = service();
    service
        .generate_season_calendar("field-1", "maize", None, date(2024, 3, 1))
        .unwrap();
    service
        .generate_season_calendar("field-1", "beans", None, date(2024, 10, 5))
        .unwrap();

    let latest = service.latest_calendar("field-1").unwrap();
    assert_eq!(latest.crop, "beans");
    assert_eq!(latest.planting_date, date(2024, 10, 5));
}

#[test]
fn test_practice_completion_and_rate() {
    let service = service();
    let planted = date(2024, 3, 1);
    service
        .generate_season_calendar("field-1", "maize", None, planted)
        .unwrap();

    let completed = service
        .mark_practice_completed("field-1", "first_weeding", Some(date(2024, 3, 22)))
        .unwrap();
    assert_eq!(completed.status, PracticeStatus::Completed);
    assert_eq!(completed.completed_date, Some(date(2024, 3, 22)));

    service
        .mark_practice_completed("field-1", "basal_fertilizer", Some(date(2024, 3, 1)))
        .unwrap();

    // Day 30: gapping (day 14) is pending and overdue; armyworm scouting
    // falls due today and does not count as overdue yet.
    let stats = service
        .completion_rate("field-1", planted + Duration::days(30))
        .unwrap();
    assert_eq!(stats.total, 8);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.completion_rate, 0.25);
    assert_eq!(stats.overdue_count, 1);
}

#[test]
fn test_completing_unknown_practice_fails() {
    let service = service();
    service
        .generate_season_calendar("field-1", "maize", None, date(2024, 3, 1))
        .unwrap();

    let err = service
        .mark_practice_completed("field-1", "pruning", None)
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn test_completing_practice_without_calendar_fails() {
    let err = service()
        .mark_practice_completed("field-9", "first_weeding", None)
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Completion is idempotent: re-marking keeps the practice completed
    /// with the latest date and never duplicates or reverts it.
    #[test]
    fn prop_completion_is_idempotent(
        first_offset in 0i64..30,
        second_offset in 0i64..30,
    ) {
        let service = service();
        let planted = date(2024, 3, 1);
        service
            .generate_season_calendar("field-1", "maize", None, planted)
            .unwrap();

        let first_date = planted + Duration::days(21 + first_offset);
        let second_date = planted + Duration::days(21 + second_offset);

        service
            .mark_practice_completed("field-1", "first_weeding", Some(first_date))
            .unwrap();
        let second = service
            .mark_practice_completed("field-1", "first_weeding", Some(second_date))
            .unwrap();

        prop_assert_eq!(second.status, PracticeStatus::Completed);
        prop_assert_eq!(second.completed_date, Some(second_date));

        let record = service.latest_calendar("field-1").unwrap();
        let completed_count = record
            .practices
            .iter()
            .filter(|p| p.key == "first_weeding" && p.status == PracticeStatus::Completed)
            .count();
        prop_assert_eq!(completed_count, 1);
    }
}
