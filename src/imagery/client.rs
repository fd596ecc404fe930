use super::ImageSource;
use crate::{
    conf::Conf,
    geometry::{BoundingBox, ImageSize},
    Error, Result,
};
use futures_util::{future::BoxFuture, FutureExt};
use reqwest::Client;
use std::time::Instant;
use tracing::{error, info};
use url::Url;

/// Static image API client in the style of the Mapbox Static Images API:
/// `{base}/{bbox}/{width}x{height}@{density}x?access_token=...`.
#[derive(Clone)]
pub struct StaticImageClient {
    client: Client,
    api_url: String,
    access_token: Option<String>,
    size: ImageSize,
}

impl StaticImageClient {
    pub fn new(conf: &Conf) -> Self {
        StaticImageClient {
            client: Client::new(),
            api_url: conf.static_image_api_url.clone(),
            access_token: conf.static_image_access_token.clone(),
            size: conf.static_image_size,
        }
    }

    pub fn url(&self, bbox: &BoundingBox) -> Result<Url> {
        let density = if self.size.density > 1 {
            format!("@{}x", self.size.density)
        } else {
            String::new()
        };
        let mut url = Url::parse(&format!(
            "{}/{}/{}x{}{}",
            self.api_url.trim_end_matches('/'),
            bbox.to_query(),
            self.size.width,
            self.size.height,
            density,
        ))?;
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        Ok(url)
    }

    pub async fn get(&self, bbox: &BoundingBox) -> Result<Vec<u8>> {
        let url = self.url(bbox)?;
        let started_at = Instant::now();
        info!(bbox = %bbox.to_query(), "Fetching static image");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "Static image API returned an error");
            return Err(Error::StaticImageApi(status.as_u16()));
        }
        let bytes = response.bytes().await?.to_vec();
        let time_ms = started_at.elapsed().as_millis();
        info!(
            len = bytes.len(),
            time_ms,
            "Fetched static image ({} bytes) in {} ms",
            bytes.len(),
            time_ms,
        );
        Ok(bytes)
    }
}

impl ImageSource for StaticImageClient {
    fn fetch(&self, bbox: BoundingBox) -> BoxFuture<'static, Result<Vec<u8>>> {
        let client = self.clone();
        async move { client.get(&bbox).await }.boxed()
    }
}
