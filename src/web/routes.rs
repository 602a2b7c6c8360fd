use actix_web::web;
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/upload", web::post().to(handlers::upload))
            .route("/continue", web::post().to(handlers::continue_with_default))
            .route("/chat", web::post().to(handlers::chat))
            .route("/history", web::get().to(handlers::history)),
    )
    .route("/", web::get().to(handlers::index))
    .route("/health", web::get().to(handlers::health_check));
}
