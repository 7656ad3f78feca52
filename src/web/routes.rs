use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/chat", web::post().to(handlers::chat))
            .route("/history", web::get().to(handlers::history))
            .route("/info", web::get().to(handlers::info))
    )
    .route("/score", web::post().to(handlers::chat))
    .route("/health", web::get().to(handlers::health_check));
}
