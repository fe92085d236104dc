//! Season calendar models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::growth::PracticePriority;
use super::nutrient::AlertUrgency;

/// A growth stage projected onto absolute dates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageWindow {
    pub key: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Lifecycle of a scheduled practice: pending -> completed, terminal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PracticeStatus {
    Pending,
    Completed,
}

/// A critical practice with a concrete due date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPractice {
    pub key: String,
    pub name: String,
    pub due_date: NaiveDate,
    pub priority: PracticePriority,
    pub status: PracticeStatus,
    pub completed_date: Option<NaiveDate>,
}

/// Rain likelihood around the harvest window
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationRisk {
    Low,
    Moderate,
    High,
}

/// The predicted harvest window with weather-adjusted guidance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestWindow {
    pub harvest_date: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub precipitation_risk: PrecipitationRisk,
    pub urgency: AlertUrgency,
    /// Crop-specific drying/storage guidance for the risk tier
    pub tips: Vec<String>,
}

/// A weekly photo checkpoint for remote crop monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoPrompt {
    pub day: u32,
    pub due_date: NaiveDate,
    pub focus: String,
}

/// A full-season calendar for one planting event.
///
/// Appended to the per-field calendar history; the most recent record is
/// the active one. Individual practices mutate status in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarRecord {
    pub field_id: String,
    pub crop: String,
    pub variety: String,
    pub planting_date: NaiveDate,
    pub maturity_days: u32,
    pub stages: Vec<StageWindow>,
    pub practices: Vec<ScheduledPractice>,
    pub harvest_window: HarvestWindow,
    pub photo_schedule: Vec<PhotoPrompt>,
    pub created_at: DateTime<Utc>,
}

impl CalendarRecord {
    pub fn practice(&self, key: &str) -> Option<&ScheduledPractice> {
        self.practices.iter().find(|p| p.key == key)
    }
}

/// Practice completion summary for a field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionStats {
    pub completed: usize,
    pub total: usize,
    /// completed / total, 0.0 when the calendar has no practices
    pub completion_rate: f64,
    pub overdue_count: usize,
}
