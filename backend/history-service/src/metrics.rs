use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, TextEncoder};

static VIEW_RECORDS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let counter = IntCounter::new(
        "history_service_view_records_total",
        "View records written to the history store",
    )
    .expect("failed to create history_service_view_records_total");
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .expect("failed to register history_service_view_records_total");
    counter
});

pub fn record_view_stored() {
    VIEW_RECORDS_TOTAL.inc();
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
