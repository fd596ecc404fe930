use crate::{
    area::{io, Area},
    conf::Conf,
    geometry::{BoundingBox, ImageSize, LatLng, Resolution},
    Result,
};
use actix_web::{
    post,
    web::{Data, Json},
};
use geojson::Geometry;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct BoundsResponse {
    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub bbox: [f64; 4],
    /// `[[min_lat, min_lon], [max_lat, max_lon]]`
    pub corners: [[f64; 2]; 2],
}

// POST /bounds, body is a GeoJSON FeatureCollection
#[post("/bounds")]
pub async fn post_bounds(body: String) -> Result<Json<BoundsResponse>> {
    let bounds = io::import(&body)?.bounds()?;
    Ok(Json(BoundsResponse {
        bbox: bounds.to_array(),
        corners: bounds.corners(),
    }))
}

#[derive(Serialize, Deserialize)]
pub struct ContainsArgs {
    pub point: LatLng,
    pub geometry: Geometry,
}

#[derive(Serialize, Deserialize)]
pub struct ContainsResponse {
    pub inside: bool,
}

#[post("/contains")]
pub async fn post_contains(args: Json<ContainsArgs>) -> Result<Json<ContainsResponse>> {
    let args = args.into_inner();
    let area = Area::new(args.geometry)?;
    Ok(Json(ContainsResponse {
        inside: area.contains(&args.point),
    }))
}

#[derive(Serialize, Deserialize)]
pub struct ResolutionArgs {
    pub bbox: [f64; 4],
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub density: Option<u32>,
}

// Missing image dimensions fall back to the static image settings
#[post("/resolution")]
pub async fn post_resolution(
    args: Json<ResolutionArgs>,
    conf: Data<Conf>,
) -> Result<Json<Resolution>> {
    let default = conf.static_image_size;
    let size = ImageSize::new(
        args.width.unwrap_or(default.width),
        args.height.unwrap_or(default.height),
        args.density.unwrap_or(default.density),
    );
    Ok(Json(Resolution::estimate(
        &BoundingBox::from(args.bbox),
        &size,
    )?))
}
