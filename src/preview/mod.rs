use crate::{area::AreaCollection, conf::Conf, session::MapView, Result};
use staticmap::{
    tools::{Color, LineBuilder},
    StaticMapBuilder,
};
use tracing::info;

const OUTLINE_WIDTH: f32 = 2.;

/// Satellite map image with the outline of every area drawn on top.
///
/// With `fit` set the map is framed around the areas, otherwise it is centered
/// on the view. Tiles are downloaded synchronously, so the work runs on the
/// blocking pool.
pub async fn render(
    areas: AreaCollection,
    view: MapView,
    fit: bool,
    conf: &Conf,
) -> Result<Vec<u8>> {
    let count = areas.len();
    let size = conf.preview_size;
    let tile_url = conf.preview_tile_url.clone();
    let res = actix_web::web::block(move || {
        let mut builder = StaticMapBuilder::default()
            .width(size)
            .height(size)
            .url_template(tile_url);
        if !fit || areas.is_empty() {
            builder = builder
                .zoom(view.zoom)
                .lat_center(view.lat)
                .lon_center(view.lon);
        }
        let mut map = builder.build()?;
        for (lats, lons) in outlines(&areas) {
            let line = LineBuilder::new()
                .lat_coordinates(lats)
                .lon_coordinates(lons)
                .width(OUTLINE_WIDTH)
                .simplify(false)
                .color(Color::new(true, 0x33, 0x88, 0xff, 255))
                .build()?;
            map.add_tool(line);
        }
        map.encode_png()
    })
    .await??;
    info!(areas = count, len = res.len(), "Rendered map preview");
    Ok(res)
}

/// Latitudes and longitudes of every ring, one pair of vectors per ring.
fn outlines(areas: &AreaCollection) -> Vec<(Vec<f64>, Vec<f64>)> {
    areas
        .iter()
        .flat_map(|area| area.polygons())
        .flatten()
        .map(|ring| -> (Vec<f64>, Vec<f64>) {
            ring.iter()
                .filter(|it| it.len() >= 2)
                .map(|it| (it[1], it[0]))
                .unzip()
        })
        .collect()
}
