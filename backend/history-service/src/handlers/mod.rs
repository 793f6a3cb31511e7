//! HTTP surface for the history service.
//!
//! The pipeline itself has no HTTP API; these routes exist for liveness
//! checks and metrics scraping.

use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "OK"}))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics));
}
