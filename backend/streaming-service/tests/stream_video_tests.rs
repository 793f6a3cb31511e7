/// HTTP-level tests for the streaming handlers with a recording publisher
/// double: the byte path and the publish path must stay decoupled, and an
/// unmapped id must never publish.
use std::path::Path;
use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;

use event_bus::EventPublisher;
use streaming_service::handlers;
use streaming_service::services::VideoCatalog;

#[derive(Default)]
struct RecordingPublisher {
    published: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, video_id: &str) {
        self.published.lock().unwrap().push(video_id.to_string());
    }
}

fn test_app_data(
    catalog: VideoCatalog,
) -> (web::Data<VideoCatalog>, web::Data<dyn EventPublisher>, Arc<RecordingPublisher>) {
    let publisher = Arc::new(RecordingPublisher::default());
    let publisher_data = web::Data::from(publisher.clone() as Arc<dyn EventPublisher>);
    (web::Data::new(catalog), publisher_data, publisher)
}

#[actix_web::test]
async fn unknown_video_id_returns_404_and_publishes_nothing() {
    let (catalog, publisher_data, publisher) =
        test_app_data(VideoCatalog::with_samples(Path::new("videos")));
    let app = test::init_service(
        App::new()
            .app_data(catalog)
            .app_data(publisher_data)
            .configure(handlers::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/video?id=99").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(publisher.published().is_empty());
}

#[actix_web::test]
async fn known_video_streams_bytes_and_publishes_once() {
    let video_dir = std::env::temp_dir().join(format!(
        "streaming-service-test-{}",
        uuid::Uuid::new_v4()
    ));
    std::fs::create_dir_all(&video_dir).unwrap();
    let video_path = video_dir.join("one.mp4");
    std::fs::write(&video_path, b"fake mp4 bytes").unwrap();

    let mut catalog = VideoCatalog::new();
    catalog.insert("1", &video_path);
    let (catalog, publisher_data, publisher) = test_app_data(catalog);

    let app = test::init_service(
        App::new()
            .app_data(catalog)
            .app_data(publisher_data)
            .configure(handlers::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/video?id=1").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "video/mp4"
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"fake mp4 bytes");
    assert_eq!(publisher.published(), vec!["1".to_string()]);

    std::fs::remove_dir_all(&video_dir).unwrap();
}

#[actix_web::test]
async fn health_reports_ok() {
    let (catalog, publisher_data, _publisher) = test_app_data(VideoCatalog::new());
    let app = test::init_service(
        App::new()
            .app_data(catalog)
            .app_data(publisher_data)
            .configure(handlers::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, serde_json::json!({"status": "OK"}));
}

#[actix_web::test]
async fn metrics_endpoint_serves_prometheus_text() {
    let (catalog, publisher_data, _publisher) = test_app_data(VideoCatalog::new());
    let app = test::init_service(
        App::new()
            .app_data(catalog)
            .app_data(publisher_data)
            .configure(handlers::configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}
