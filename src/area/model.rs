use crate::{
    geometry::{bounds, contains, LatLng},
    Error, Result,
};
use geojson::{Feature, Geometry, JsonObject, PolygonType, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

pub const NAME_PROPERTY: &str = "name";

/// A drawn or imported polygon together with its properties.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Area {
    pub geometry: Geometry,
    pub properties: JsonObject,
}

/// Labels offered after drawing a new area. Stored lowercase in the `name` property.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
pub enum AreaLabel {
    #[strum(serialize = "building")]
    Building,
    #[strum(serialize = "agricultural field")]
    AgriculturalField,
    #[strum(serialize = "vegetation")]
    Vegetation,
    #[strum(serialize = "water")]
    Water,
    #[strum(serialize = "road")]
    Road,
    #[strum(serialize = "unknown area")]
    Unknown,
}

impl Area {
    pub fn new(geometry: Geometry) -> Result<Area> {
        validate(&geometry)?;
        Ok(Area {
            geometry,
            properties: JsonObject::new(),
        })
    }

    pub fn from_feature(feature: Feature) -> Result<Area> {
        let geometry = feature
            .geometry
            .ok_or(Error::InvalidInput("Feature has no geometry".into()))?;
        let mut area = Area::new(geometry)?;
        area.properties = feature.properties.unwrap_or_default();
        Ok(area)
    }

    pub fn to_feature(&self) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(self.geometry.clone()),
            id: None,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.get(NAME_PROPERTY).and_then(Value::as_str)
    }

    pub fn set_label(&mut self, label: AreaLabel) {
        self.properties
            .insert(NAME_PROPERTY.into(), Value::String(label.to_string()));
    }

    pub fn same_geometry(&self, geometry: &Geometry) -> bool {
        self.geometry.value == geometry.value
    }

    pub fn polygons(&self) -> Vec<&PolygonType> {
        match &self.geometry.value {
            geojson::Value::Polygon(polygon) => vec![polygon],
            geojson::Value::MultiPolygon(polygons) => polygons.iter().collect(),
            _ => vec![],
        }
    }

    /// Every position of every ring, holes included.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.polygons().into_iter().flatten().flatten()
    }

    pub fn outer_rings(&self) -> impl Iterator<Item = &[Position]> {
        self.polygons()
            .into_iter()
            .filter_map(|it| it.first().map(Vec::as_slice))
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        match &self.geometry.value {
            geojson::Value::Polygon(polygon) => {
                contains::polygon_contains(polygon, point.lat, point.lng)
            }
            geojson::Value::MultiPolygon(polygons) => {
                contains::multi_polygon_contains(polygons, point.lat, point.lng)
            }
            _ => false,
        }
    }
}

fn validate(geometry: &Geometry) -> Result<()> {
    match &geometry.value {
        geojson::Value::Polygon(polygon) => validate_polygon(polygon),
        geojson::Value::MultiPolygon(polygons) => {
            if polygons.is_empty() {
                return Err(Error::InvalidInput("MultiPolygon has no polygons".into()));
            }
            polygons.iter().try_for_each(validate_polygon)
        }
        other => Err(Error::UnsupportedGeometry(type_name(other).into())),
    }
}

fn validate_polygon(polygon: &PolygonType) -> Result<()> {
    if polygon.first().map_or(true, Vec::is_empty) {
        return Err(Error::InvalidInput("Polygon has no outer ring".into()));
    }
    for position in polygon.iter().flatten() {
        bounds::lon_lat(position)?;
    }
    Ok(())
}

fn type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{mock_square, mock_square_geometry};
    use std::str::FromStr;

    #[test]
    fn new_rejects_point() {
        let geometry = Geometry::new(geojson::Value::Point(vec![9.0, 45.0]));
        match Area::new(geometry) {
            Err(Error::UnsupportedGeometry(name)) => assert_eq!(name, "Point"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn new_rejects_empty_polygon() {
        let geometry = Geometry::new(geojson::Value::Polygon(vec![]));
        assert!(matches!(Area::new(geometry), Err(Error::InvalidInput(_))));
        let geometry = Geometry::new(geojson::Value::MultiPolygon(vec![]));
        assert!(matches!(Area::new(geometry), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn from_feature_without_properties() {
        let feature = Feature {
            bbox: None,
            geometry: Some(mock_square_geometry(0.0, 0.0, 1.0)),
            id: None,
            properties: None,
            foreign_members: None,
        };
        let area = Area::from_feature(feature).unwrap();
        assert!(area.properties.is_empty());
        assert_eq!(area.name(), None);
    }

    #[test]
    fn set_label() {
        let mut area = mock_square(0.0, 0.0, 1.0);
        area.set_label(AreaLabel::AgriculturalField);
        assert_eq!(area.name(), Some("agricultural field"));
        area.set_label(AreaLabel::Unknown);
        assert_eq!(area.name(), Some("unknown area"));
    }

    #[test]
    fn label_from_str() {
        assert_eq!(AreaLabel::from_str("water").unwrap(), AreaLabel::Water);
        assert!(AreaLabel::from_str("lava").is_err());
    }

    #[test]
    fn contains_multi_polygon() {
        let geometry = Geometry::new(geojson::Value::MultiPolygon(vec![
            vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 1.0],
                vec![0.0, 0.0],
            ]],
            vec![vec![
                vec![5.0, 5.0],
                vec![6.0, 5.0],
                vec![6.0, 6.0],
                vec![5.0, 6.0],
                vec![5.0, 5.0],
            ]],
        ]));
        let area = Area::new(geometry).unwrap();
        assert!(area.contains(&LatLng::new(0.5, 0.5)));
        assert!(area.contains(&LatLng::new(5.5, 5.5)));
        assert!(!area.contains(&LatLng::new(3.0, 3.0)));
        assert_eq!(area.outer_rings().count(), 2);
        assert_eq!(area.positions().count(), 10);
    }
}
