use super::Area;
use crate::{
    geometry::{bounds, BoundingBox, LatLng},
    Result,
};
use geojson::{FeatureCollection, Geometry};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Insertion-ordered set of areas. Two areas never share the same geometry.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct AreaCollection {
    areas: Vec<Area>,
}

impl AreaCollection {
    pub fn new() -> Self {
        AreaCollection::default()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Area> {
        self.areas.iter()
    }

    pub fn contains_geometry(&self, geometry: &Geometry) -> bool {
        self.areas.iter().any(|it| it.same_geometry(geometry))
    }

    /// Returns `false` and leaves the collection untouched if an area with the
    /// same geometry is already stored.
    pub fn push(&mut self, area: Area) -> bool {
        if self.contains_geometry(&area.geometry) {
            return false;
        }
        self.areas.push(area);
        true
    }

    /// Removes the most recently added area containing the point.
    pub fn remove_containing(&mut self, point: &LatLng) -> Option<Area> {
        let index = self.areas.iter().rposition(|it| it.contains(point))?;
        Some(self.areas.remove(index))
    }

    /// Names are compared case-insensitively, imported files may not use lowercase.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let name = name.to_lowercase();
        let before = self.areas.len();
        self.areas
            .retain(|it| it.name().map(str::to_lowercase).as_deref() != Some(name.as_str()));
        before - self.areas.len()
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }

    pub fn bounds(&self) -> Result<BoundingBox> {
        BoundingBox::from_positions(self.areas.iter().flat_map(Area::positions))
    }

    pub fn vertex_center(&self) -> Result<LatLng> {
        bounds::vertex_center(self.areas.iter().flat_map(Area::outer_rings))
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.areas.iter().map(Area::to_feature).collect(),
            foreign_members: None,
        }
    }
}

impl TryFrom<FeatureCollection> for AreaCollection {
    type Error = crate::Error;

    fn try_from(collection: FeatureCollection) -> Result<Self> {
        let mut res = AreaCollection::new();
        for feature in collection.features {
            if !res.push(Area::from_feature(feature)?) {
                debug!("Skipping duplicate geometry");
            }
        }
        Ok(res)
    }
}

impl<'a> IntoIterator for &'a AreaCollection {
    type Item = &'a Area;
    type IntoIter = std::slice::Iter<'a, Area>;

    fn into_iter(self) -> Self::IntoIter {
        self.areas.iter()
    }
}
