use super::AreaCollection;
use crate::{Error, Result};
use geojson::{FeatureCollection, GeoJson};

pub const MIME_TYPE: &str = "application/geo+json";
pub const FILE_EXTENSION: &str = ".geojson";

/// Parses a FeatureCollection carrying at least one feature.
pub fn parse(content: &str) -> Result<FeatureCollection> {
    match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => {
            if collection.features.is_empty() {
                Err(Error::InvalidInput(
                    "GeoJSON document contains no features".into(),
                ))
            } else {
                Ok(collection)
            }
        }
        _ => Err(Error::InvalidInput(
            "GeoJSON document must be a FeatureCollection".into(),
        )),
    }
}

pub fn import(content: &str) -> Result<AreaCollection> {
    parse(content)?.try_into()
}

pub fn export(areas: &AreaCollection) -> String {
    GeoJson::FeatureCollection(areas.to_feature_collection()).to_string()
}

/// File name for a download, `requested` wins when it is not blank.
pub fn export_file_name(requested: Option<&str>, areas: usize) -> String {
    match requested.map(str::trim).filter(|it| !it.is_empty()) {
        Some(name) if name.ends_with(FILE_EXTENSION) => name.to_string(),
        Some(name) => format!("{name}{FILE_EXTENSION}"),
        None => match areas {
            0 => "empty.geojson",
            1 => "data.geojson",
            _ => "multi_data.geojson",
        }
        .to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{area::AreaLabel, test::mock_square};
    use serde_json::{json, Value};

    #[test]
    fn export_then_import() {
        let mut areas = AreaCollection::new();
        let mut building = mock_square(9.0, 45.0, 0.001);
        building.set_label(AreaLabel::Building);
        let mut water = mock_square(9.01, 45.01, 0.002);
        water.set_label(AreaLabel::Water);
        water
            .properties
            .insert("depth".into(), Value::String("2m".into()));
        areas.push(building);
        areas.push(water);
        let imported = import(&export(&areas)).unwrap();
        assert_eq!(imported, areas);
    }

    #[test]
    fn export_format() {
        let mut areas = AreaCollection::new();
        let mut area = mock_square(0.0, 0.0, 1.0);
        area.set_label(AreaLabel::Road);
        areas.push(area);
        let exported: Value = serde_json::from_str(&export(&areas)).unwrap();
        assert_eq!(exported["type"], "FeatureCollection");
        assert_eq!(exported["features"][0]["type"], "Feature");
        assert_eq!(exported["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(exported["features"][0]["properties"], json!({"name": "road"}));
    }

    #[test]
    fn import_missing_features() {
        let res = import(r#"{"type": "FeatureCollection", "features": []}"#);
        assert!(matches!(res, Err(Error::InvalidInput(_))));
        let res = import(r#"{"type": "FeatureCollection"}"#);
        assert!(matches!(res, Err(Error::GeoJson(_))));
    }

    #[test]
    fn import_wrong_geometry() {
        let res = import(
            &json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [9.0, 45.0]},
                    "properties": {"name": "pin"}
                }]
            })
            .to_string(),
        );
        assert!(matches!(res, Err(Error::UnsupportedGeometry(_))));
    }

    #[test]
    fn import_not_a_collection() {
        let res = import(r#"{"type": "Point", "coordinates": [9.0, 45.0]}"#);
        assert!(matches!(res, Err(Error::InvalidInput(_))));
        assert!(import("not json").is_err());
    }

    #[test]
    fn export_file_name() {
        assert_eq!(super::export_file_name(None, 0), "empty.geojson");
        assert_eq!(super::export_file_name(None, 1), "data.geojson");
        assert_eq!(super::export_file_name(Some(" "), 3), "multi_data.geojson");
        assert_eq!(super::export_file_name(Some("fields"), 3), "fields.geojson");
        assert_eq!(
            super::export_file_name(Some("fields.geojson"), 3),
            "fields.geojson"
        );
    }
}
