//! HTTP handlers for the streaming service.
//!
//! `/video` is a plain static-file byte responder; the interesting part is
//! the viewed-event publish that follows every successful stream.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use event_bus::EventPublisher;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::services::VideoCatalog;

#[derive(Debug, Deserialize)]
pub struct VideoQuery {
    pub id: String,
}

/// GET /video?id=<videoId>
///
/// Streams the mapped file and notifies the bus that the video was
/// viewed. The publish happens after the service has committed to serving
/// bytes and is fire-and-forget: a broker outage never fails the stream.
pub async fn stream_video(
    query: web::Query<VideoQuery>,
    catalog: web::Data<VideoCatalog>,
    publisher: web::Data<dyn EventPublisher>,
) -> Result<HttpResponse> {
    let video_id = query.id.as_str();

    let Some(path) = catalog.resolve(video_id) else {
        warn!(video_id, "Video not found");
        return Err(AppError::NotFound(format!("video {video_id} not found")));
    };

    let file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();

    info!(video_id, size, "Streaming video");
    metrics::record_video_streamed();

    publisher.publish(video_id).await;

    Ok(HttpResponse::Ok()
        .content_type("video/mp4")
        .no_chunking(size)
        .streaming(ReaderStream::new(file)))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "OK"}))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/video", web::get().to(stream_video))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(crate::metrics::serve_metrics));
}
