//! HTTP handlers for the Shamba Advisory Platform

mod calendar;
mod climate;
mod growth;
mod harvest;
mod health;
mod nutrient;
mod planting;
mod signals;

pub use calendar::*;
pub use climate::*;
pub use growth::*;
pub use harvest::*;
pub use health::*;
pub use nutrient::*;
pub use planting::*;
pub use signals::*;
