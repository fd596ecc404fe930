use crate::{
    geometry::ImageSize,
    session::MapView,
    Error, Result,
};
use std::{env, fmt::Display, str::FromStr, time::Duration};

/// Runtime settings, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Conf {
    pub bind: String,
    pub port: u16,
    pub static_image_api_url: String,
    pub static_image_access_token: Option<String>,
    pub static_image_size: ImageSize,
    pub image_cache_capacity: usize,
    pub preview_tile_url: String,
    pub preview_size: u32,
    pub session_ttl: Duration,
    pub default_view: MapView,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            bind: "127.0.0.1".into(),
            port: 8000,
            static_image_api_url: "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/static"
                .into(),
            static_image_access_token: None,
            static_image_size: ImageSize::new(600, 600, 2),
            image_cache_capacity: 64,
            preview_tile_url:
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
                    .into(),
            preview_size: 800,
            session_ttl: Duration::from_secs(3600),
            default_view: MapView::default(),
        }
    }
}

impl Conf {
    pub fn from_env() -> Result<Conf> {
        Conf::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Conf> {
        let default = Conf::default();
        let density = parse(&var, "STATIC_IMAGE_DENSITY", default.static_image_size.density)?;
        if !(1..=2).contains(&density) {
            return Err(Error::InvalidInput(format!(
                "STATIC_IMAGE_DENSITY must be 1 or 2, got {density}"
            )));
        }
        Ok(Conf {
            bind: var("GEODASH_BIND").unwrap_or(default.bind),
            port: parse(&var, "GEODASH_PORT", default.port)?,
            static_image_api_url: var("STATIC_IMAGE_API_URL")
                .unwrap_or(default.static_image_api_url),
            static_image_access_token: var("STATIC_IMAGE_ACCESS_TOKEN")
                .filter(|it| !it.is_empty()),
            static_image_size: ImageSize::new(
                parse(&var, "STATIC_IMAGE_WIDTH", default.static_image_size.width)?,
                parse(&var, "STATIC_IMAGE_HEIGHT", default.static_image_size.height)?,
                density,
            ),
            image_cache_capacity: parse(&var, "IMAGE_CACHE_CAPACITY", default.image_cache_capacity)?,
            preview_tile_url: var("PREVIEW_TILE_URL").unwrap_or(default.preview_tile_url),
            preview_size: parse(&var, "PREVIEW_SIZE", default.preview_size)?,
            session_ttl: Duration::from_secs(parse(
                &var,
                "SESSION_TTL_SECS",
                default.session_ttl.as_secs(),
            )?),
            default_view: MapView {
                lat: parse(&var, "DEFAULT_LAT", default.default_view.lat)?,
                lon: parse(&var, "DEFAULT_LON", default.default_view.lon)?,
                zoom: parse(&var, "DEFAULT_ZOOM", default.default_view.zoom)?,
            },
        })
    }
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| Error::InvalidInput(format!("{name}: {e}"))),
        None => Ok(default),
    }
}
