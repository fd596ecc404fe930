use crate::{
    analysis::AnalysisReport,
    conf::Conf,
    imagery::{layer::ThermalColors, Layer, StaticImageCache},
    Result,
};
use actix_web::{
    post,
    web::{Data, Json, Query},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct AnalysisArgs {
    pub layer: Option<Layer>,
    pub dark: Option<String>,
    pub light: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub report: AnalysisReport,
    /// Base64 encoded, as returned by the static image API
    pub image: String,
    pub layer: Option<LayerImage>,
}

#[derive(Serialize, Deserialize)]
pub struct LayerImage {
    pub layer: Layer,
    /// Base64 encoded PNG
    pub image: String,
}

// POST /analysis?layer=pt&dark=%23000000&light=%23FF0000, body is a GeoJSON FeatureCollection
#[post("")]
pub async fn post(
    args: Query<AnalysisArgs>,
    body: String,
    conf: Data<Conf>,
    cache: Data<StaticImageCache>,
) -> Result<Json<AnalysisResponse>> {
    let colors = ThermalColors::parse(args.dark.as_deref(), args.light.as_deref())?;
    let report = AnalysisReport::new(&body, &conf.static_image_size)?;
    let comparison = report.compare(&cache, args.layer, colors).await?;
    Ok(Json(AnalysisResponse {
        image: STANDARD.encode(comparison.original.as_slice()),
        layer: comparison.layer.map(|(layer, bytes)| LayerImage {
            layer,
            image: STANDARD.encode(bytes),
        }),
        report,
    }))
}

// Same report without touching the static image API
#[post("/report")]
pub async fn post_report(body: String, conf: Data<Conf>) -> Result<Json<AnalysisReport>> {
    Ok(Json(AnalysisReport::new(&body, &conf.static_image_size)?))
}
