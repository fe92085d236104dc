//! Growth model registry
//!
//! Static per-crop/variety reference tables, validated once at process
//! start. All derived queries are pure functions over (model, planting
//! date, current date).

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use shared::models::{
    CriticalPractice, DueStatus, GrowthCurvePoint, GrowthModel, GrowthStage, NutrientAmounts,
    NutrientUptake, PracticePriority, StageInfo, UpcomingPractice, OVERDUE_STAGE_KEY,
};
use shared::validation::validate_growth_model;

use crate::error::{AppError, AppResult};

/// Practices this far past due are still listed as overdue
const OVERDUE_VISIBILITY_DAYS: i64 = 7;

/// Registry of built-in growth models, keyed by crop and variety
pub struct GrowthModelRegistry {
    crops: HashMap<String, CropEntry>,
}

struct CropEntry {
    default_variety: String,
    varieties: HashMap<String, GrowthModel>,
}

impl GrowthModelRegistry {
    /// Build the registry from the built-in model tables, validating every
    /// model's invariants. Fails fast on any malformed model.
    pub fn builtin() -> AppResult<Self> {
        let mut registry = Self {
            crops: HashMap::new(),
        };

        registry.insert(maize_h614())?;
        registry.insert(maize_dk8031())?;
        registry.insert(beans_rose_coco())?;
        registry.insert(sorghum_gadam())?;

        Ok(registry)
    }

    fn insert(&mut self, model: GrowthModel) -> AppResult<()> {
        validate_growth_model(&model).map_err(|msg| {
            AppError::Configuration(format!(
                "growth model {}/{}: {}",
                model.crop, model.variety, msg
            ))
        })?;

        let entry = self
            .crops
            .entry(model.crop.clone())
            .or_insert_with(|| CropEntry {
                // First variety registered for a crop is its default
                default_variety: model.variety.clone(),
                varieties: HashMap::new(),
            });
        entry.varieties.insert(model.variety.clone(), model);
        Ok(())
    }

    /// Look up a model, falling back to the crop's default variety
    pub fn get(&self, crop: &str, variety: Option<&str>) -> AppResult<&GrowthModel> {
        let crop_key = crop.to_lowercase();
        let entry = self
            .crops
            .get(&crop_key)
            .ok_or_else(|| AppError::NotFound(format!("Growth model for crop '{}'", crop)))?;

        let variety_key = variety
            .map(str::to_lowercase)
            .unwrap_or_else(|| entry.default_variety.clone());

        entry.varieties.get(&variety_key).ok_or_else(|| {
            AppError::NotFound(format!("Variety '{}' of crop '{}'", variety_key, crop))
        })
    }

    /// Registered crop names
    pub fn crops(&self) -> Vec<String> {
        let mut names: Vec<String> = self.crops.keys().cloned().collect();
        names.sort();
        names
    }

    /// The stage a field is in on `today`.
    ///
    /// Days before planting clamp to day 0. From maturity onward the
    /// synthetic terminal "overdue" stage is reported at 100% progress.
    pub fn current_stage(
        &self,
        model: &GrowthModel,
        planting_date: NaiveDate,
        today: NaiveDate,
    ) -> StageInfo {
        let days_after_planting = (today - planting_date).num_days();
        let day = days_after_planting.max(0) as u32;

        if day >= model.maturity_days {
            return StageInfo {
                stage_key: OVERDUE_STAGE_KEY.to_string(),
                stage_name: "Overdue for harvest".to_string(),
                start_day: model.maturity_days,
                end_day: model.maturity_days,
                days_after_planting,
                progress_percent: 100.0,
                overdue: true,
            };
        }

        // Validated stage ranges are contiguous over [0, maturity], so the
        // scan always finds a bracket; the fallback only guards the types.
        let stage = model
            .stages
            .iter()
            .find(|s| day >= s.start_day && day <= s.end_day)
            .unwrap_or(&model.stages[model.stages.len() - 1]);

        let span = (stage.end_day - stage.start_day).max(1) as f64;
        let progress = ((day - stage.start_day) as f64 / span * 100.0).clamp(0.0, 100.0);

        StageInfo {
            stage_key: stage.key.clone(),
            stage_name: stage.name.clone(),
            start_day: stage.start_day,
            end_day: stage.end_day,
            days_after_planting,
            progress_percent: progress,
            overdue: false,
        }
    }

    /// Critical practices falling within [-7, lookahead_days] of today,
    /// sorted soonest first.
    pub fn upcoming_practices(
        &self,
        model: &GrowthModel,
        planting_date: NaiveDate,
        today: NaiveDate,
        lookahead_days: i64,
    ) -> Vec<UpcomingPractice> {
        let days_after_planting = (today - planting_date).num_days();

        let mut practices: Vec<UpcomingPractice> = model
            .critical_practices
            .iter()
            .filter_map(|practice| {
                let days_until_due = practice.day_offset as i64 - days_after_planting;
                if days_until_due < -OVERDUE_VISIBILITY_DAYS || days_until_due > lookahead_days {
                    return None;
                }

                let status = if days_until_due < 0 {
                    DueStatus::Overdue
                } else if days_until_due == 0 {
                    DueStatus::DueToday
                } else if days_until_due <= 3 {
                    DueStatus::DueSoon
                } else {
                    DueStatus::Upcoming
                };

                Some(UpcomingPractice {
                    key: practice.key.clone(),
                    name: practice.name.clone(),
                    priority: practice.priority,
                    due_date: planting_date + Duration::days(practice.day_offset as i64),
                    days_until_due,
                    status,
                })
            })
            .collect();

        practices.sort_by_key(|p| p.days_until_due);
        practices
    }

    /// Weekly expected-health reference curve (0-10 scale), shaped by the
    /// stage the sampled day falls into. Used only for comparison against
    /// observed crop condition, never for forecasting.
    pub fn optimal_growth_curve(&self, model: &GrowthModel) -> Vec<GrowthCurvePoint> {
        let mut curve = Vec::new();
        let mut day = 0u32;
        while day <= model.maturity_days {
            let stage = model
                .stages
                .iter()
                .find(|s| day >= s.start_day && day <= s.end_day)
                .unwrap_or(&model.stages[model.stages.len() - 1]);

            let span = (stage.end_day - stage.start_day).max(1) as f64;
            let t = (day - stage.start_day) as f64 / span;

            let score = expected_score(&stage.key, &stage.name, t);
            curve.push(GrowthCurvePoint {
                day,
                expected_score: score.clamp(0.0, 10.0),
            });
            day += 7;
        }
        curve
    }
}

/// Expected health score for a point within a stage, keyed by stage name
/// keywords: establishment starts low, vegetative ramps up, flowering peaks
/// around 9, maturity tapers down.
fn expected_score(stage_key: &str, stage_name: &str, t: f64) -> f64 {
    let label = format!("{} {}", stage_key, stage_name).to_lowercase();

    if label.contains("germination") || label.contains("establishment") {
        2.0 + 2.0 * t
    } else if label.contains("vegetative") {
        4.0 + 4.0 * t
    } else if label.contains("flower")
        || label.contains("tassel")
        || label.contains("silk")
        || label.contains("pod")
    {
        9.0 - (t - 0.5).abs()
    } else if label.contains("grain") || label.contains("fill") {
        8.5 - t
    } else if label.contains("maturity") || label.contains("drying") || label.contains("ripen") {
        7.5 - 2.5 * t
    } else {
        6.0
    }
}

// ============================================================================
// Built-in models
// ============================================================================

fn stage(key: &str, name: &str, start_day: u32, end_day: u32) -> GrowthStage {
    GrowthStage {
        key: key.to_string(),
        name: name.to_string(),
        start_day,
        end_day,
    }
}

fn practice(key: &str, name: &str, day_offset: u32, priority: PracticePriority) -> CriticalPractice {
    CriticalPractice {
        key: key.to_string(),
        name: name.to_string(),
        day_offset,
        priority,
    }
}

fn percentages(entries: &[(&str, i64)]) -> HashMap<String, Decimal> {
    entries
        .iter()
        .map(|(key, pct)| (key.to_string(), Decimal::from(*pct)))
        .collect()
}

fn maize_h614() -> GrowthModel {
    GrowthModel {
        crop: "maize".to_string(),
        variety: "h614".to_string(),
        maturity_days: 120,
        stages: vec![
            stage("germination", "Germination & establishment", 0, 14),
            stage("vegetative", "Vegetative growth", 15, 49),
            stage("tasseling", "Tasseling & silking", 50, 75),
            stage("grain_fill", "Grain filling", 76, 104),
            stage("maturity", "Maturity & drying", 105, 120),
        ],
        critical_practices: vec![
            practice(
                "basal_fertilizer",
                "Basal fertilizer at planting",
                0,
                PracticePriority::High,
            ),
            practice("gapping", "Gapping and thinning", 14, PracticePriority::Medium),
            practice("first_weeding", "First weeding", 21, PracticePriority::High),
            practice(
                "armyworm_scouting",
                "Fall armyworm scouting",
                30,
                PracticePriority::High,
            ),
            practice(
                "top_dressing_1",
                "First nitrogen top dressing",
                35,
                PracticePriority::High,
            ),
            practice("second_weeding", "Second weeding", 42, PracticePriority::Medium),
            practice(
                "top_dressing_2",
                "Second nitrogen top dressing",
                55,
                PracticePriority::High,
            ),
            practice(
                "harvest_prep",
                "Prepare drying and storage",
                110,
                PracticePriority::Medium,
            ),
        ],
        nutrient_uptake: NutrientUptake {
            totals_per_hectare: NutrientAmounts::new(
                Decimal::from(120),
                Decimal::from(50),
                Decimal::from(100),
            ),
            stage_percentages: percentages(&[
                ("germination", 5),
                ("vegetative", 35),
                ("tasseling", 30),
                ("grain_fill", 25),
                ("maturity", 5),
            ]),
        },
    }
}

fn maize_dk8031() -> GrowthModel {
    GrowthModel {
        crop: "maize".to_string(),
        variety: "dk8031".to_string(),
        maturity_days: 90,
        stages: vec![
            stage("germination", "Germination & establishment", 0, 10),
            stage("vegetative", "Vegetative growth", 11, 40),
            stage("tasseling", "Tasseling & silking", 41, 60),
            stage("grain_fill", "Grain filling", 61, 80),
            stage("maturity", "Maturity & drying", 81, 90),
        ],
        critical_practices: vec![
            practice(
                "basal_fertilizer",
                "Basal fertilizer at planting",
                0,
                PracticePriority::High,
            ),
            practice("first_weeding", "First weeding", 18, PracticePriority::High),
            practice(
                "armyworm_scouting",
                "Fall armyworm scouting",
                25,
                PracticePriority::High,
            ),
            practice(
                "top_dressing_1",
                "Nitrogen top dressing",
                30,
                PracticePriority::High,
            ),
            practice(
                "harvest_prep",
                "Prepare drying and storage",
                82,
                PracticePriority::Medium,
            ),
        ],
        nutrient_uptake: NutrientUptake {
            totals_per_hectare: NutrientAmounts::new(
                Decimal::from(100),
                Decimal::from(40),
                Decimal::from(80),
            ),
            stage_percentages: percentages(&[
                ("germination", 5),
                ("vegetative", 35),
                ("tasseling", 30),
                ("grain_fill", 25),
                ("maturity", 5),
            ]),
        },
    }
}

fn beans_rose_coco() -> GrowthModel {
    GrowthModel {
        crop: "beans".to_string(),
        variety: "rose_coco".to_string(),
        maturity_days: 85,
        stages: vec![
            stage("germination", "Germination & establishment", 0, 10),
            stage("vegetative", "Vegetative growth", 11, 35),
            stage("flowering", "Flowering", 36, 55),
            stage("pod_fill", "Pod filling", 56, 75),
            stage("maturity", "Maturity & drying", 76, 85),
        ],
        critical_practices: vec![
            practice("first_weeding", "First weeding", 14, PracticePriority::High),
            practice(
                "aphid_scouting",
                "Aphid and bean fly scouting",
                28,
                PracticePriority::Medium,
            ),
            practice(
                "foliar_feed",
                "Foliar feed at flowering",
                40,
                PracticePriority::Low,
            ),
            practice(
                "harvest_prep",
                "Prepare drying and storage",
                78,
                PracticePriority::Medium,
            ),
        ],
        nutrient_uptake: NutrientUptake {
            totals_per_hectare: NutrientAmounts::new(
                Decimal::from(40),
                Decimal::from(45),
                Decimal::from(60),
            ),
            stage_percentages: percentages(&[
                ("germination", 5),
                ("vegetative", 30),
                ("flowering", 35),
                ("pod_fill", 25),
                ("maturity", 5),
            ]),
        },
    }
}

fn sorghum_gadam() -> GrowthModel {
    GrowthModel {
        crop: "sorghum".to_string(),
        variety: "gadam".to_string(),
        maturity_days: 110,
        stages: vec![
            stage("germination", "Germination & establishment", 0, 12),
            stage("vegetative", "Vegetative growth", 13, 55),
            stage("flowering", "Booting & flowering", 56, 80),
            stage("grain_fill", "Grain filling", 81, 100),
            stage("maturity", "Maturity & drying", 101, 110),
        ],
        critical_practices: vec![
            practice("first_weeding", "First weeding", 20, PracticePriority::High),
            practice(
                "top_dressing_1",
                "Nitrogen top dressing",
                40,
                PracticePriority::High,
            ),
            practice("bird_scaring", "Bird scaring", 85, PracticePriority::High),
            practice(
                "harvest_prep",
                "Prepare drying and storage",
                100,
                PracticePriority::Medium,
            ),
        ],
        nutrient_uptake: NutrientUptake {
            totals_per_hectare: NutrientAmounts::new(
                Decimal::from(80),
                Decimal::from(40),
                Decimal::from(70),
            ),
            stage_percentages: percentages(&[
                ("germination", 5),
                ("vegetative", 35),
                ("flowering", 30),
                ("grain_fill", 25),
                ("maturity", 5),
            ]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_builtin_models_validate() {
        let registry = GrowthModelRegistry::builtin().unwrap();
        assert_eq!(registry.crops(), vec!["beans", "maize", "sorghum"]);
    }

    #[test]
    fn test_default_variety_lookup() {
        let registry = GrowthModelRegistry::builtin().unwrap();
        let model = registry.get("maize", None).unwrap();
        assert_eq!(model.variety, "h614");

        let fast = registry.get("Maize", Some("DK8031")).unwrap();
        assert_eq!(fast.maturity_days, 90);
    }

    #[test]
    fn test_unknown_crop_and_variety() {
        let registry = GrowthModelRegistry::builtin().unwrap();
        assert!(registry.get("cassava", None).is_err());
        assert!(registry.get("maize", Some("p3253")).is_err());
    }

    #[test]
    fn test_stage_progress_midway() {
        let registry = GrowthModelRegistry::builtin().unwrap();
        let model = registry.get("maize", None).unwrap();

        let planted = date(2024, 3, 1);
        let info = registry.current_stage(model, planted, date(2024, 3, 31));
        assert_eq!(info.stage_key, "vegetative");
        assert!(!info.overdue);
        assert!(info.progress_percent > 0.0 && info.progress_percent < 100.0);
    }

    #[test]
    fn test_overdue_from_maturity_day() {
        let registry = GrowthModelRegistry::builtin().unwrap();
        let model = registry.get("maize", None).unwrap();

        let planted = date(2024, 1, 1);
        let info = registry.current_stage(model, planted, planted + Duration::days(120));
        assert!(info.overdue);
        assert_eq!(info.stage_key, OVERDUE_STAGE_KEY);
        assert_eq!(info.progress_percent, 100.0);
    }

    #[test]
    fn test_upcoming_practices_window_and_order() {
        let registry = GrowthModelRegistry::builtin().unwrap();
        let model = registry.get("maize", None).unwrap();

        // Day 21: first weeding due today, gapping 7 days overdue,
        // scouting and top dressing within a 14-day lookahead.
        let planted = date(2024, 3, 1);
        let today = planted + Duration::days(21);
        let practices = registry.upcoming_practices(model, planted, today, 14);

        let keys: Vec<&str> = practices.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["gapping", "first_weeding", "armyworm_scouting", "top_dressing_1"]
        );
        assert_eq!(practices[0].status, DueStatus::Overdue);
        assert_eq!(practices[1].status, DueStatus::DueToday);
        assert_eq!(practices[2].status, DueStatus::Upcoming);
    }

    #[test]
    fn test_growth_curve_shape() {
        let registry = GrowthModelRegistry::builtin().unwrap();
        let model = registry.get("maize", None).unwrap();

        let curve = registry.optimal_growth_curve(model);
        assert!(!curve.is_empty());
        assert!(curve.iter().all(|p| (0.0..=10.0).contains(&p.expected_score)));

        // Flowering should score above establishment
        let early = curve.iter().find(|p| p.day == 7).unwrap().expected_score;
        let peak = curve.iter().find(|p| p.day == 63).unwrap().expected_score;
        assert!(peak > early);
    }
}
