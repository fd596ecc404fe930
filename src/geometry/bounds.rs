use super::LatLng;
use crate::{Error, Result};
use geojson::Position;
use serde::{Deserialize, Serialize};

/// Axis-aligned lon/lat rectangle.
///
/// Longitudes are compared raw, so a set of polygons crossing the antimeridian
/// produces a box spanning the whole globe in the wrong direction. Such input is
/// not supported.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        BoundingBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Tightest box around every position. Fails with [`Error::NoAreas`] when
    /// there is nothing to enclose.
    pub fn from_positions<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Result<Self> {
        let mut positions = positions.into_iter();
        let first = positions.next().ok_or(Error::NoAreas)?;
        let (lon, lat) = lon_lat(first)?;
        let mut res = BoundingBox::new(lon, lat, lon, lat);
        for position in positions {
            let (lon, lat) = lon_lat(position)?;
            res.min_lon = res.min_lon.min(lon);
            res.min_lat = res.min_lat.min(lat);
            res.max_lon = res.max_lon.max(lon);
            res.max_lat = res.max_lat.max(lat);
        }
        Ok(res)
    }

    /// Lat-first corners as map widgets expect them: `[[min_lat, min_lon], [max_lat, max_lon]]`.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lat, self.min_lon], [self.max_lat, self.max_lon]]
    }

    /// `[min_lon,min_lat,max_lon,max_lat]`, the path segment static image APIs take.
    pub fn to_query(&self) -> String {
        format!(
            "[{},{},{},{}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Hashable identity of the box, `-0.0` and `0.0` collapse into one key.
    pub fn key(&self) -> [u64; 4] {
        self.to_array().map(|it| (it + 0.0).to_bits())
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lng >= self.min_lon && lng <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(bbox: [f64; 4]) -> Self {
        BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3])
    }
}

/// Arithmetic mean of the vertices of the given closed rings, skipping each ring's
/// closing point so it isn't counted twice.
pub fn vertex_center<'a>(rings: impl IntoIterator<Item = &'a [Position]>) -> Result<LatLng> {
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut count = 0usize;
    for ring in rings {
        let open = match ring.split_last() {
            Some((last, rest)) if !rest.is_empty() && rest.first() == Some(last) => rest,
            _ => ring,
        };
        for position in open {
            let (lon, lat) = lon_lat(position)?;
            lon_sum += lon;
            lat_sum += lat;
            count += 1;
        }
    }
    if count == 0 {
        return Err(Error::NoAreas);
    }
    Ok(LatLng::new(lat_sum / count as f64, lon_sum / count as f64))
}

pub(crate) fn lon_lat(position: &Position) -> Result<(f64, f64)> {
    match position.as_slice() {
        [lon, lat, ..] => Ok((*lon, *lat)),
        _ => Err(Error::InvalidInput(format!(
            "Position must have at least 2 coordinates, got {}",
            position.len()
        ))),
    }
}
