use crate::{
    area::{io, AreaCollection},
    geometry::{BoundingBox, ImageSize, LatLng, Resolution},
    imagery::{layer::ThermalColors, Layer, StaticImageCache},
    Result,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// GeoJSON without a `crs` member is WGS 84 by definition.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Summary of an uploaded area file.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisReport {
    pub crs: String,
    pub areas: usize,
    pub bounds: BoundingBox,
    pub corners: [[f64; 2]; 2],
    pub center: LatLng,
    pub image_size: ImageSize,
    /// Rounded to 4 decimals.
    pub resolution: Resolution,
}

/// A static image and, when requested, the same image with a layer applied.
pub struct Comparison {
    pub original: Arc<Vec<u8>>,
    pub layer: Option<(Layer, Vec<u8>)>,
}

impl AnalysisReport {
    pub fn new(content: &str, image_size: &ImageSize) -> Result<AnalysisReport> {
        let collection = io::parse(content)?;
        let crs = crs_name(&collection);
        let areas = AreaCollection::try_from(collection)?;
        let bounds = areas.bounds()?;
        let report = AnalysisReport {
            crs,
            areas: areas.len(),
            bounds,
            corners: bounds.corners(),
            center: areas.vertex_center()?,
            image_size: *image_size,
            resolution: Resolution::estimate(&bounds, image_size)?.rounded(4),
        };
        info!(
            areas = report.areas,
            bbox = %report.bounds.to_query(),
            crs = %report.crs,
            "Analyzed GeoJSON upload",
        );
        Ok(report)
    }

    pub async fn compare(
        &self,
        cache: &StaticImageCache,
        layer: Option<Layer>,
        colors: ThermalColors,
    ) -> Result<Comparison> {
        let original = cache.get(&self.bounds).await?;
        let layer = match layer {
            Some(layer) => {
                let bytes = original.clone();
                let res = actix_web::web::block(move || {
                    crate::imagery::layer::apply(&bytes, layer, &colors)
                })
                .await??;
                Some((layer, res))
            }
            None => None,
        };
        Ok(Comparison { original, layer })
    }
}

fn crs_name(collection: &FeatureCollection) -> String {
    collection
        .foreign_members
        .as_ref()
        .and_then(|it| it.get("crs"))
        .and_then(|it| it.pointer("/properties/name"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CRS)
        .to_string()
}
