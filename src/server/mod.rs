use crate::{
    conf::Conf,
    error,
    imagery::{StaticImageCache, StaticImageClient},
    rest,
    session::SessionStore,
    Result,
};
use actix_web::dev::Service;
use actix_web::web::{scope, JsonConfig, PayloadConfig, QueryConfig};
use actix_web::{
    middleware::{Compress, NormalizePath},
    web::Data,
    App, HttpServer,
};
use futures_util::future::FutureExt;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

const SLOW_REQUEST_SECS: f64 = 5.0;

// Area uploads arrive as raw or JSON wrapped GeoJSON
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub async fn run(conf: Conf) -> Result<()> {
    // Shared by all workers
    let sessions = Data::new(SessionStore::new(conf.session_ttl));
    let images = Data::new(StaticImageCache::new(
        Arc::new(StaticImageClient::new(&conf)),
        conf.image_cache_capacity,
    ));
    let addr = (conf.bind.clone(), conf.port);
    let conf = Data::new(conf);
    info!(bind = %addr.0, port = addr.1, "Starting server");

    HttpServer::new(move || {
        App::new()
            .wrap_fn(|req, srv| {
                let req_query_string = req.query_string().to_string();
                let req_method = req.method().as_str().to_string();
                let req_path = req.path().to_string();
                let req_time = OffsetDateTime::now_utc();
                let req_ip = req
                    .connection_info()
                    .peer_addr()
                    .unwrap_or_default()
                    .to_string();
                srv.call(req).map(move |res| {
                    if let Ok(res) = res.as_ref() {
                        let res_status = res.status().as_u16();
                        let res_time_sec = (OffsetDateTime::now_utc() - req_time).as_seconds_f64();
                        if res_time_sec > SLOW_REQUEST_SECS {
                            info!(
                                req_query_string,
                                req_method,
                                req_path,
                                req_ip,
                                res_status,
                                res_time_sec,
                                "Slow request",
                            );
                        }
                    }
                    res
                })
            })
            .wrap(NormalizePath::trim())
            .wrap(Compress::default())
            .app_data(conf.clone())
            .app_data(sessions.clone())
            .app_data(images.clone())
            .app_data(QueryConfig::default().error_handler(error::query_error_handler))
            .app_data(PayloadConfig::new(MAX_BODY_BYTES))
            .app_data(
                JsonConfig::default()
                    .limit(MAX_BODY_BYTES)
                    .error_handler(error::json_error_handler),
            )
            .service(
                scope("v1")
                    .service(rest::v1::geometry::post_bounds)
                    .service(rest::v1::geometry::post_contains)
                    .service(rest::v1::geometry::post_resolution)
                    .service(
                        scope("analysis")
                            .service(rest::v1::analysis::post)
                            .service(rest::v1::analysis::post_report),
                    )
                    .service(
                        scope("sessions")
                            .service(rest::v1::sessions::post)
                            .service(rest::v1::sessions::get)
                            .service(rest::v1::sessions::delete)
                            .service(rest::v1::sessions::post_interaction)
                            .service(rest::v1::sessions::get_export)
                            .service(rest::v1::sessions::get_preview),
                    ),
            )
    })
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}
