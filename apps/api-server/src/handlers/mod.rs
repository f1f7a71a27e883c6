//! HTTP handlers and route configuration.

mod explore;
mod health;

use actix_web::{HttpRequest, error, web};

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(reject))
        .app_data(web::JsonConfig::default().error_handler(reject))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/explore")
                        .route("", web::get().to(explore::get_feed))
                        .route("/engagement", web::post().to(explore::record_engagement))
                        .route(
                            "/sessions/{session_id}",
                            web::delete().to(explore::end_session),
                        ),
                ),
        );
}

/// Answer extractor failures with the standard error envelope.
fn reject<E: std::fmt::Display>(err: E, _req: &HttpRequest) -> error::Error {
    AppError::BadRequest(err.to_string()).into()
}
