use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, TextEncoder};

static VIDEOS_STREAMED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "streaming_service_videos_streamed_total",
        "Video streams served to clients",
    )
    .expect("failed to create streaming_service_videos_streamed_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register streaming_service_videos_streamed_total");
    counter
});

pub fn record_video_streamed() {
    VIDEOS_STREAMED_TOTAL.inc();
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
