//! Business logic services for the Shamba Advisory Platform

pub mod calendar;
pub mod climate;
pub mod growth;
pub mod harvest;
pub mod nutrient;
pub mod planting;

pub use calendar::CalendarService;
pub use climate::ClimateRiskService;
pub use growth::GrowthModelRegistry;
pub use harvest::HarvestService;
pub use nutrient::NutrientService;
pub use planting::PlantingAdvisorService;
