//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A farm location: GPS coordinates plus the zone tag that crowdsourced
/// climate reports aggregate under.
///
/// Zone tags are coarse (ward or sub-county level); two reports carrying
/// the same tag are treated as describing the same local conditions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub coordinates: GpsCoordinates,
    pub zone: String,
}

impl Location {
    pub fn new(coordinates: GpsCoordinates, zone: impl Into<String>) -> Self {
        Self {
            coordinates,
            zone: zone.into(),
        }
    }
}
