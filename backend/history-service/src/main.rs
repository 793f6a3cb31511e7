use actix_web::{middleware, App, HttpServer};
use db_pool::{create_pool as create_pg_pool, DbConfig};
use event_bus::{Subscriber, SubscriberConfig};
use history_service::services::{PgViewStore, ViewedEventHandler};
use history_service::{handlers, Config};
use std::io;
use std::sync::Arc;
use std::time::Duration;
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

    tracing::info!("Starting history-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let mut db_cfg = DbConfig::from_env("history-service")
        .expect("Failed to load database configuration");
    db_cfg.max_connections = std::cmp::max(db_cfg.max_connections, config.database.max_connections);
    db_cfg.log_config();
    let db_pool = create_pg_pool(db_cfg)
        .await
        .expect("Failed to create database pool");

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Connecting to AMQP broker...");
    let bus_connection = event_bus::connect(&config.bus.amqp_url)
        .await
        .expect("Failed to connect to AMQP broker");

    let store = Arc::new(PgViewStore::new(db_pool));
    let handler = Arc::new(ViewedEventHandler::new(store));
    let subscriber = Arc::new(Subscriber::new(
        SubscriberConfig {
            amqp_url: config.bus.amqp_url.clone(),
            consumer_tag: "history-service".to_string(),
            ack_policy: Default::default(),
            reconnect_delay: Duration::from_secs(config.bus.reconnect_delay_secs),
        },
        handler,
    ));
    tokio::spawn(subscriber.start_consuming(bus_connection));

    let addr = format!("0.0.0.0:{}", config.app.port);
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&addr)?
    .run()
    .await
}
