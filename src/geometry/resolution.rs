use super::BoundingBox;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude on a spherical Earth.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
    /// Pixel density multiplier, 2 for an `@2x` image.
    pub density: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32, density: u32) -> Self {
        ImageSize {
            width,
            height,
            density,
        }
    }

    pub fn effective_width(&self) -> u64 {
        self.width as u64 * self.density as u64
    }

    pub fn effective_height(&self) -> u64 {
        self.height as u64 * self.density as u64
    }
}

/// Ground resolution of an image covering a bounding box.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// Meters per pixel along the north-south axis.
    pub resolution_lat: f64,
    /// Meters per pixel along the east-west axis.
    pub resolution_lon: f64,
    /// Square meters covered by one pixel.
    pub pixel_area: f64,
}

impl Resolution {
    /// Flat-Earth estimate, good for boxes around the size of a satellite tile.
    /// Large boxes and high latitudes get increasingly wrong.
    pub fn estimate(bbox: &BoundingBox, size: &ImageSize) -> Result<Resolution> {
        if bbox.to_array().iter().any(|it| !it.is_finite()) {
            return Err(Error::InvalidInput(
                "Bounding box coordinates must be finite".into(),
            ));
        }
        let lat_range = -90.0..=90.0;
        let lon_range = -180.0..=180.0;
        if ![bbox.min_lat, bbox.max_lat].iter().all(|it| lat_range.contains(it))
            || ![bbox.min_lon, bbox.max_lon].iter().all(|it| lon_range.contains(it))
        {
            return Err(Error::InvalidInput(format!(
                "Bounding box is out of range: {}",
                bbox.to_query()
            )));
        }
        if bbox.max_lat < bbox.min_lat || bbox.max_lon < bbox.min_lon {
            return Err(Error::InvalidInput(format!(
                "Bounding box is inverted: {}",
                bbox.to_query()
            )));
        }
        if bbox.max_lat == bbox.min_lat && bbox.max_lon == bbox.min_lon {
            return Err(Error::DegenerateBoundingBox);
        }
        if size.effective_width() == 0 || size.effective_height() == 0 {
            return Err(Error::InvalidInput(
                "Image width, height and density must be positive".into(),
            ));
        }
        let center_lat = (bbox.min_lat + bbox.max_lat) / 2.0;
        let lat_distance = (bbox.max_lat - bbox.min_lat) * METERS_PER_DEGREE;
        let lon_distance =
            (bbox.max_lon - bbox.min_lon) * METERS_PER_DEGREE * center_lat.to_radians().cos();
        let resolution_lat = lat_distance / size.effective_height() as f64;
        let resolution_lon = lon_distance / size.effective_width() as f64;
        Ok(Resolution {
            resolution_lat,
            resolution_lon,
            pixel_area: resolution_lat * resolution_lon,
        })
    }

    pub fn rounded(&self, decimals: i32) -> Resolution {
        let factor = 10f64.powi(decimals);
        let round = |it: f64| (it * factor).round() / factor;
        Resolution {
            resolution_lat: round(self.resolution_lat),
            resolution_lon: round(self.resolution_lon),
            pixel_area: round(self.pixel_area),
        }
    }
}
