//! Closed-form geometry used by the map and analysis pages.
//!
//! Coordinates follow GeoJSON ordering: every position is `[lon, lat, ..]`.

pub mod bounds;
pub mod contains;
pub mod resolution;

pub use bounds::BoundingBox;
pub use resolution::{ImageSize, Resolution};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }
}
