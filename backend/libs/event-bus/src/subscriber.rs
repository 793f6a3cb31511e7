//! Subscriber runtime for the viewed-event pipeline.
//!
//! Each consumer process owns exactly one `Subscriber`. On every
//! (re)connect it rebuilds the full subscription from scratch: channel,
//! exchange declaration, a broker-named exclusive queue, the binding, and
//! the manual-ack consume stream. Nothing about the subscription survives
//! a disconnect, so there is no durable state to reconcile.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, QueueBindOptions, QueueDeclareOptions},
    types::FieldTable,
    Connection,
};
use tokio::time::sleep;
use tracing::{error, info, warn};

use event_schema::VIEWED_EXCHANGE;

use crate::error::BusError;
use crate::metrics;
use crate::publisher::declare_viewed_exchange;

/// Terminal result of handling one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A view record was persisted.
    Stored,
    /// The payload was readable but not actionable; nothing persisted.
    Skipped,
    /// Decode or persistence failed; nothing persisted.
    Failed,
}

impl HandleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleOutcome::Stored => "stored",
            HandleOutcome::Skipped => "skipped",
            HandleOutcome::Failed => "failed",
        }
    }
}

/// Per-message business logic supplied by each consumer service.
///
/// Implementations must contain their own errors; the returned outcome is
/// the only failure signal the runtime sees.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> HandleOutcome;
}

/// Decides whether a delivery is acknowledged, as a pure function of the
/// handling outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AckPolicy {
    /// Acknowledge every message, including failures. A poisoned message
    /// is logged and dropped instead of blocking the queue.
    #[default]
    Always,
    /// Nack failed messages back onto the queue for redelivery.
    RequeueFailures,
}

impl AckPolicy {
    pub fn should_ack(&self, outcome: HandleOutcome) -> bool {
        match self {
            AckPolicy::Always => true,
            AckPolicy::RequeueFailures => outcome != HandleOutcome::Failed,
        }
    }
}

/// Subscriber configuration.
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// AMQP broker URL, used when rebuilding a lost connection.
    pub amqp_url: String,
    /// Tag identifying this consumer in broker logs.
    pub consumer_tag: String,
    /// Acknowledgement policy applied to every handling outcome.
    pub ack_policy: AckPolicy,
    /// Delay before rebuilding the subscription after a failure.
    pub reconnect_delay: Duration,
}

/// Consume loop driver owned by one consumer process.
pub struct Subscriber {
    config: SubscriberConfig,
    handler: Arc<dyn EventHandler>,
}

impl Subscriber {
    pub fn new(config: SubscriberConfig, handler: Arc<dyn EventHandler>) -> Self {
        Self { config, handler }
    }

    /// Run forever, starting on `connection` and reconnecting on failure.
    ///
    /// Spawn this in a background task. The initial connection is made by
    /// the caller so that an unreachable broker at startup stays fatal;
    /// once consuming has started, connection loss is survivable and the
    /// loop rebuilds the whole subscription after `reconnect_delay`.
    pub async fn start_consuming(self: Arc<Self>, connection: Connection) {
        info!(consumer_tag = %self.config.consumer_tag, "Starting viewed-event subscriber");

        let mut connection = Some(connection);
        loop {
            let conn = match connection.take() {
                Some(conn) => conn,
                None => match crate::connect(&self.config.amqp_url).await {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!(error = %e, "Failed to reconnect to AMQP broker, retrying");
                        sleep(self.config.reconnect_delay).await;
                        continue;
                    }
                },
            };

            match self.consume_loop(&conn).await {
                Ok(()) => {
                    warn!("Consume stream ended unexpectedly, rebuilding subscription");
                }
                Err(e) => {
                    error!(error = %e, "Subscriber error, rebuilding subscription");
                }
            }

            sleep(self.config.reconnect_delay).await;
        }
    }

    /// One full subscription lifetime: declare, bind, consume until the
    /// stream ends or errors.
    async fn consume_loop(&self, connection: &Connection) -> Result<(), BusError> {
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BusError::Channel(format!("Failed to create channel: {e}")))?;

        declare_viewed_exchange(&channel).await?;

        // Broker-named queue, exclusive to this connection: every consumer
        // gets its own copy of each event and the queue dies with the
        // process.
        let queue = channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Channel(format!("Failed to declare queue: {e}")))?;
        let queue_name = queue.name().as_str().to_string();

        channel
            .queue_bind(
                &queue_name,
                VIEWED_EXCHANGE,
                "",
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Channel(format!("Failed to bind queue {queue_name}: {e}")))?;

        info!(
            queue = %queue_name,
            exchange = VIEWED_EXCHANGE,
            "Created private queue and bound it to fanout exchange"
        );

        let mut consumer = channel
            .basic_consume(
                &queue_name,
                &self.config.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| BusError::Consume(format!("Failed to start consuming: {e}")))?;

        while let Some(delivery) = consumer.next().await {
            let delivery =
                delivery.map_err(|e| BusError::Consume(format!("Delivery failed: {e}")))?;

            let outcome = self.handler.handle(&delivery.data).await;
            metrics::record_consumed(outcome);

            if self.config.ack_policy.should_ack(outcome) {
                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    // An unacked message is redelivered once the
                    // subscription is rebuilt.
                    warn!(error = %e, "Failed to ack delivery");
                }
            } else if let Err(e) = delivery
                .nack(BasicNackOptions {
                    requeue: true,
                    ..Default::default()
                })
                .await
            {
                warn!(error = %e, "Failed to nack delivery");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_policy_acks_every_outcome() {
        let policy = AckPolicy::Always;
        assert!(policy.should_ack(HandleOutcome::Stored));
        assert!(policy.should_ack(HandleOutcome::Skipped));
        assert!(policy.should_ack(HandleOutcome::Failed));
    }

    #[test]
    fn test_requeue_policy_nacks_only_failures() {
        let policy = AckPolicy::RequeueFailures;
        assert!(policy.should_ack(HandleOutcome::Stored));
        assert!(policy.should_ack(HandleOutcome::Skipped));
        assert!(!policy.should_ack(HandleOutcome::Failed));
    }

    #[test]
    fn test_default_policy_is_always_ack() {
        assert_eq!(AckPolicy::default(), AckPolicy::Always);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(HandleOutcome::Stored.as_str(), "stored");
        assert_eq!(HandleOutcome::Skipped.as_str(), "skipped");
        assert_eq!(HandleOutcome::Failed.as_str(), "failed");
    }

    #[test]
    fn test_subscriber_config_creation() {
        let config = SubscriberConfig {
            amqp_url: "amqp://localhost:5672".to_string(),
            consumer_tag: "history-service".to_string(),
            ack_policy: AckPolicy::Always,
            reconnect_delay: Duration::from_secs(5),
        };

        assert_eq!(config.amqp_url, "amqp://localhost:5672");
        assert_eq!(config.consumer_tag, "history-service");
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
    }
}
