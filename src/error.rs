use actix_web::{
    error::{BlockingError, JsonPayloadError, QueryPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

#[derive(Debug)]
pub enum Error {
    NotFound(String),
    IO(std::io::Error),
    Reqwest(reqwest::Error),
    SerdeJson(serde_json::Error),
    GeoJson(geojson::Error),
    Image(image::ImageError),
    StaticMap(staticmap::Error),
    Url(url::ParseError),
    Blocking(BlockingError),
    InvalidInput(String),
    UnsupportedGeometry(String),
    NoAreas,
    DegenerateBoundingBox,
    StaticImageApi(u16),
    Shared(Arc<Error>),
    CLI(String),
    Generic(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(err) => write!(f, "{}", err),
            Error::IO(err) => err.fmt(f),
            Error::Reqwest(err) => err.fmt(f),
            Error::SerdeJson(err) => err.fmt(f),
            Error::GeoJson(err) => err.fmt(f),
            Error::Image(err) => err.fmt(f),
            Error::StaticMap(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
            Error::Blocking(err) => err.fmt(f),
            Error::InvalidInput(err) => write!(f, "{}", err),
            Error::UnsupportedGeometry(r#type) => write!(
                f,
                "Unsupported geometry type: {}, only Polygon and MultiPolygon are allowed",
                r#type
            ),
            Error::NoAreas => write!(f, "No areas to compute bounds from"),
            Error::DegenerateBoundingBox => {
                write!(f, "Degenerate bounding box: it has zero width and height")
            }
            Error::StaticImageApi(status) => {
                write!(f, "Static image API responded with status {}", status)
            }
            Error::Shared(err) => err.fmt(f),
            Error::CLI(err) => write!(f, "{}", err),
            Error::Generic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<&str> for Error {
    fn from(str: &str) -> Self {
        Error::Generic(str.to_owned())
    }
}

impl From<String> for Error {
    fn from(str: String) -> Self {
        Error::Generic(str)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Reqwest(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerdeJson(error)
    }
}

impl From<geojson::Error> for Error {
    fn from(error: geojson::Error) -> Self {
        Error::GeoJson(error)
    }
}

impl From<image::ImageError> for Error {
    fn from(error: image::ImageError) -> Self {
        Error::Image(error)
    }
}

impl From<staticmap::Error> for Error {
    fn from(error: staticmap::Error) -> Self {
        Error::StaticMap(error)
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::Url(error)
    }
}

impl From<BlockingError> for Error {
    fn from(error: BlockingError) -> Self {
        Error::Blocking(error)
    }
}

impl From<Arc<Error>> for Error {
    fn from(error: Arc<Error>) -> Self {
        Error::Shared(error)
    }
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::InvalidInput(format!("Invalid arguments: {err}")).into()
}

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::InvalidInput(format!("Invalid body: {err}")).into()
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub http_code: u16,
    pub message: String,
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError {
            http_code: self.status_code().as_u16(),
            message: self.to_string(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_)
            | Error::UnsupportedGeometry(_)
            | Error::NoAreas
            | Error::DegenerateBoundingBox
            | Error::GeoJson(_)
            | Error::SerdeJson(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::StaticImageApi(_) | Error::Reqwest(_) => StatusCode::BAD_GATEWAY,
            Error::Shared(err) => err.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shared_error_keeps_inner_status() {
        let err: Error = Arc::new(Error::StaticImageApi(401)).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Static image API responded with status 401");
    }

    #[test]
    fn geometry_errors_are_bad_requests() {
        assert_eq!(Error::NoAreas.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::DegenerateBoundingBox.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::UnsupportedGeometry("Point".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::NotFound("Session not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
