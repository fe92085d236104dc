//! Season calendar generation and practice tracking
//!
//! A calendar is generated once per planting event and appended to the
//! field's history; the most recent record is the active one. Practice
//! completion mutates the active record in place through the document
//! store's atomic per-key update.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, Utc};

use shared::models::{
    AlertUrgency, CalendarRecord, CompletionStats, HarvestWindow, PhotoPrompt, PracticeStatus,
    PrecipitationRisk, ScheduledPractice, StageWindow,
};

use crate::error::{AppError, AppResult};
use crate::store::{load_document, DocumentStore};

use super::climate::seasonal_risk_for_month;
use super::growth::GrowthModelRegistry;

/// Half-width of the harvest window around the predicted date
const HARVEST_WINDOW_DAYS: i64 = 7;

/// Weekly photo checkpoints start a week after planting
const PHOTO_INTERVAL_DAYS: u32 = 7;

fn calendar_key(field_id: &str) -> String {
    format!("calendar:{}", field_id)
}

/// Season calendar service
#[derive(Clone)]
pub struct CalendarService {
    registry: Arc<GrowthModelRegistry>,
    documents: Arc<dyn DocumentStore>,
}

impl CalendarService {
    pub fn new(registry: Arc<GrowthModelRegistry>, documents: Arc<dyn DocumentStore>) -> Self {
        Self {
            registry,
            documents,
        }
    }

    /// Generate the full-season calendar for a planting event and append it
    /// to the field's calendar history.
    pub fn generate_season_calendar(
        &self,
        field_id: &str,
        crop: &str,
        variety: Option<&str>,
        planting_date: NaiveDate,
    ) -> AppResult<CalendarRecord> {
        let model = self.registry.get(crop, variety)?;

        let stages = model
            .stages
            .iter()
            .map(|stage| StageWindow {
                key: stage.key.clone(),
                name: stage.name.clone(),
                start_date: planting_date + Duration::days(stage.start_day as i64),
                end_date: planting_date + Duration::days(stage.end_day as i64),
            })
            .collect();

        let practices = model
            .critical_practices
            .iter()
            .map(|practice| ScheduledPractice {
                key: practice.key.clone(),
                name: practice.name.clone(),
                due_date: planting_date + Duration::days(practice.day_offset as i64),
                priority: practice.priority,
                status: PracticeStatus::Pending,
                completed_date: None,
            })
            .collect();

        let harvest_date = planting_date + Duration::days(model.maturity_days as i64);
        let precipitation_risk = harvest_precipitation_risk(harvest_date);
        let harvest_window = HarvestWindow {
            harvest_date,
            window_start: harvest_date - Duration::days(HARVEST_WINDOW_DAYS),
            window_end: harvest_date + Duration::days(HARVEST_WINDOW_DAYS),
            precipitation_risk,
            urgency: match precipitation_risk {
                PrecipitationRisk::High => AlertUrgency::High,
                PrecipitationRisk::Moderate => AlertUrgency::Medium,
                PrecipitationRisk::Low => AlertUrgency::Low,
            },
            tips: harvest_tips(&model.crop, precipitation_risk),
        };

        let mut photo_schedule = Vec::new();
        let mut day = PHOTO_INTERVAL_DAYS;
        while day <= model.maturity_days {
            let stage = self.registry.current_stage(
                model,
                planting_date,
                planting_date + Duration::days(day as i64),
            );
            photo_schedule.push(PhotoPrompt {
                day,
                due_date: planting_date + Duration::days(day as i64),
                focus: format!("Weekly photo: {}", stage.stage_name),
            });
            day += PHOTO_INTERVAL_DAYS;
        }

        let record = CalendarRecord {
            field_id: field_id.to_string(),
            crop: model.crop.clone(),
            variety: model.variety.clone(),
            planting_date,
            maturity_days: model.maturity_days,
            stages,
            practices,
            harvest_window,
            photo_schedule,
            created_at: Utc::now(),
        };

        let key = calendar_key(field_id);
        let appended = record.clone();
        self.documents.update(&key, &mut |current| {
            let mut history: Vec<CalendarRecord> = match current {
                Some(value) => serde_json::from_value(value)
                    .map_err(|e| AppError::StorageError(e.to_string()))?,
                None => Vec::new(),
            };
            history.push(appended.clone());
            serde_json::to_value(&history).map_err(|e| AppError::StorageError(e.to_string()))
        })?;

        tracing::info!(field_id, crop = %model.crop, %planting_date, "generated season calendar");
        Ok(record)
    }

    /// The active (most recent) calendar for a field
    pub fn latest_calendar(&self, field_id: &str) -> AppResult<CalendarRecord> {
        let history: Vec<CalendarRecord> =
            load_document(self.documents.as_ref(), &calendar_key(field_id))?
                .unwrap_or_default();
        history
            .into_iter()
            .last()
            .ok_or_else(|| AppError::NotFound(format!("Calendar for field '{}'", field_id)))
    }

    /// Mark a practice completed in the active calendar.
    ///
    /// Idempotent: re-marking an already completed practice only refreshes
    /// its completion date; status never reverts to pending.
    pub fn mark_practice_completed(
        &self,
        field_id: &str,
        practice_key: &str,
        completed_date: Option<NaiveDate>,
    ) -> AppResult<ScheduledPractice> {
        let key = calendar_key(field_id);
        let date = completed_date.unwrap_or_else(|| Utc::now().date_naive());
        let mut updated: Option<ScheduledPractice> = None;

        self.documents.update(&key, &mut |current| {
            let value = current.ok_or_else(|| {
                AppError::NotFound(format!("Calendar for field '{}'", field_id))
            })?;
            let mut history: Vec<CalendarRecord> = serde_json::from_value(value)
                .map_err(|e| AppError::StorageError(e.to_string()))?;

            let record = history.last_mut().ok_or_else(|| {
                AppError::NotFound(format!("Calendar for field '{}'", field_id))
            })?;
            let practice = record
                .practices
                .iter_mut()
                .find(|p| p.key == practice_key)
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Practice '{}' in the calendar for field '{}'",
                        practice_key, field_id
                    ))
                })?;

            practice.status = PracticeStatus::Completed;
            practice.completed_date = Some(date);
            updated = Some(practice.clone());

            serde_json::to_value(&history).map_err(|e| AppError::StorageError(e.to_string()))
        })?;

        updated.ok_or_else(|| AppError::Internal("practice update produced no result".to_string()))
    }

    /// Completion statistics for the active calendar
    pub fn completion_rate(&self, field_id: &str, today: NaiveDate) -> AppResult<CompletionStats> {
        let record = self.latest_calendar(field_id)?;

        let total = record.practices.len();
        let completed = record
            .practices
            .iter()
            .filter(|p| p.status == PracticeStatus::Completed)
            .count();
        let overdue_count = record
            .practices
            .iter()
            .filter(|p| p.status == PracticeStatus::Pending && p.due_date < today)
            .count();

        Ok(CompletionStats {
            completed,
            total,
            completion_rate: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            },
            overdue_count,
        })
    }
}

/// Precipitation risk for the harvest month, read off the seasonal
/// climatology. The table tracks drought risk, so a low-risk month is a
/// rainy one: seasonal risk <= 0.3 means harvest lands in the rains.
fn harvest_precipitation_risk(harvest_date: NaiveDate) -> PrecipitationRisk {
    let seasonal_risk = seasonal_risk_for_month(harvest_date.month());
    if seasonal_risk <= 0.3 {
        PrecipitationRisk::High
    } else if seasonal_risk >= 0.6 {
        PrecipitationRisk::Low
    } else {
        PrecipitationRisk::Moderate
    }
}

/// Crop-specific drying and storage guidance per precipitation tier
fn harvest_tips(crop: &str, risk: PrecipitationRisk) -> Vec<String> {
    let tips: &[&str] = match (crop, risk) {
        ("maize", PrecipitationRisk::High) => &[
            "Harvest as soon as cobs reach black layer; wet-season mold risk is high",
            "Dry on raised racks under cover, never on bare ground",
            "Treat and seal storage bags against weevils before loading",
        ],
        ("maize", PrecipitationRisk::Moderate) => &[
            "Watch the zone's rain reports and shell promptly after drying",
            "Target below 13% grain moisture before storage",
        ],
        ("maize", PrecipitationRisk::Low) => &[
            "Field-dry to below 13% moisture before shelling",
            "Dry-season harvest: prioritize clean shelling surfaces over speed",
        ],
        ("beans", PrecipitationRisk::High) => &[
            "Pull plants early and finish drying under cover; pods split when re-wetted",
            "Thresh only once pods rattle",
        ],
        ("beans", _) => &[
            "Thresh when pods rattle and winnow on a dry afternoon",
            "Store in airtight containers against bruchids",
        ],
        ("sorghum", PrecipitationRisk::High) => &[
            "Cut heads promptly at hard dough; wet heads mold within days",
            "Dry heads on racks before threshing",
        ],
        ("sorghum", _) => &[
            "Harvest at hard dough stage and dry heads before threshing",
        ],
        (_, PrecipitationRisk::High) => &[
            "Rain is likely at harvest; arrange covered drying space in advance",
        ],
        _ => &[
            "Dry produce fully before storage and check stores for leaks",
        ],
    };
    tips.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_precipitation_tiers() {
        fn date(y: i32, m: u32, d: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(y, m, d).unwrap()
        }

        // April sits in the long rains, January deep in the dry season
        assert_eq!(
            harvest_precipitation_risk(date(2024, 4, 15)),
            PrecipitationRisk::High
        );
        assert_eq!(
            harvest_precipitation_risk(date(2024, 1, 15)),
            PrecipitationRisk::Low
        );
        assert_eq!(
            harvest_precipitation_risk(date(2024, 3, 15)),
            PrecipitationRisk::Moderate
        );
    }
}
