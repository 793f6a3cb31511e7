use actix_web::{middleware, web, App, HttpServer};
use event_bus::{EventPublisher, PublisherConfig, ViewPublisher};
use std::io;
use std::sync::Arc;
use streaming_service::services::VideoCatalog;
use streaming_service::{handlers, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!("Starting streaming-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    tracing::info!("Connecting to AMQP broker...");
    let bus_connection = event_bus::connect(&config.bus.amqp_url)
        .await
        .expect("Failed to connect to AMQP broker");

    let publisher = ViewPublisher::bind(
        &bus_connection,
        PublisherConfig {
            confirm_delivery: config.bus.confirm_delivery,
        },
    )
    .await
    .expect("Failed to bind view publisher");
    let publisher: Arc<dyn EventPublisher> = Arc::new(publisher);
    let publisher = web::Data::from(publisher);

    let catalog = web::Data::new(VideoCatalog::with_samples(&config.video.dir));
    tracing::info!(videos = catalog.len(), "Video catalog loaded");

    let addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(publisher.clone())
            .app_data(catalog.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&addr)?
    .run()
    .await
}
