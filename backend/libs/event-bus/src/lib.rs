//! AMQP plumbing shared by the streaming producer and its consumers.
//!
//! The publisher side declares the `viewed` fanout exchange and sends
//! fire-and-forget notifications; the subscriber side binds a private
//! exclusive queue to that exchange and drives a manual-ack consume loop.
//! Both sides work against connection handles constructed once at startup
//! and passed in by the owning service.

pub mod error;
pub mod metrics;
pub mod publisher;
pub mod subscriber;

pub use error::BusError;
pub use publisher::{EventPublisher, PublisherConfig, ViewPublisher};
pub use subscriber::{AckPolicy, EventHandler, HandleOutcome, Subscriber, SubscriberConfig};

use lapin::{Connection, ConnectionProperties};

/// Open the long-lived bus connection.
///
/// Called once per process at startup; a failure here is fatal to the
/// caller. Reconnection after startup is handled by the subscriber's
/// supervision loop, not here.
pub async fn connect(amqp_url: &str) -> Result<Connection, BusError> {
    let connection = Connection::connect(amqp_url, ConnectionProperties::default())
        .await
        .map_err(|e| BusError::Connection(format!("Failed to connect to AMQP broker: {e}")))?;

    tracing::info!("Connected to AMQP broker");
    Ok(connection)
}
