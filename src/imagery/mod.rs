pub mod cache;
pub use cache::StaticImageCache;
pub mod client;
pub use client::StaticImageClient;
pub mod layer;
pub use layer::Layer;

use crate::{geometry::BoundingBox, Result};
use futures_util::future::BoxFuture;

/// Anything able to produce a satellite raster for a bounding box.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, bbox: BoundingBox) -> BoxFuture<'static, Result<Vec<u8>>>;
}
