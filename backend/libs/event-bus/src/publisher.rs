//! Publish side of the viewed-event pipeline.

use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions},
    publisher_confirm::Confirmation,
    types::FieldTable,
    BasicProperties, Channel, Connection, ExchangeKind,
};
use tracing::{debug, info, warn};

use event_schema::{ViewedEvent, VIEWED_EXCHANGE};

use crate::error::BusError;
use crate::metrics;

/// Publish-side surface the streaming handlers depend on.
///
/// Implementations must contain their own errors: announcing a view can
/// never fail the byte stream that triggered it.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Announce that `video_id` was streamed to a client.
    async fn publish(&self, video_id: &str);
}

/// Publisher configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Await the broker's confirmation for each publish.
    ///
    /// Off by default: the pipeline favors stream availability over
    /// delivery guarantees, so sends are fire-and-forget. Turning this on
    /// puts the channel into confirm mode and waits for the broker ack
    /// before counting the event as published.
    pub confirm_delivery: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            confirm_delivery: false,
        }
    }
}

/// Producer handle for the `viewed` fanout exchange.
pub struct ViewPublisher {
    channel: Channel,
    config: PublisherConfig,
}

impl ViewPublisher {
    /// Create a channel on `connection` and declare the fanout exchange
    /// (create-if-absent, safe to repeat).
    pub async fn bind(
        connection: &Connection,
        config: PublisherConfig,
    ) -> Result<Self, BusError> {
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| BusError::Channel(format!("Failed to create channel: {e}")))?;

        declare_viewed_exchange(&channel).await?;

        if config.confirm_delivery {
            channel
                .confirm_select(ConfirmSelectOptions::default())
                .await
                .map_err(|e| BusError::Channel(format!("Failed to enable confirms: {e}")))?;
        }

        info!(
            exchange = VIEWED_EXCHANGE,
            confirm_delivery = config.confirm_delivery,
            "View publisher bound to fanout exchange"
        );

        Ok(Self { channel, config })
    }

    async fn try_publish(&self, video_id: &str) -> Result<(), BusError> {
        let payload = ViewedEvent::new(video_id).to_bytes()?;

        // Fanout ignores routing keys, so the key stays empty.
        let confirm = self
            .channel
            .basic_publish(
                VIEWED_EXCHANGE,
                "",
                BasicPublishOptions::default(),
                &payload,
                BasicProperties::default(),
            )
            .await
            .map_err(|e| BusError::Channel(format!("Failed to publish message: {e}")))?;

        if self.config.confirm_delivery {
            let confirmation = confirm
                .await
                .map_err(|e| BusError::Channel(format!("Publish confirmation failed: {e}")))?;
            if let Confirmation::Nack(_) = confirmation {
                return Err(BusError::Channel(
                    "Broker negatively acknowledged publish".to_string(),
                ));
            }
        }

        metrics::record_publish();
        debug!(video_id, exchange = VIEWED_EXCHANGE, "Published viewed event");
        Ok(())
    }
}

#[async_trait]
impl EventPublisher for ViewPublisher {
    async fn publish(&self, video_id: &str) {
        if let Err(e) = self.try_publish(video_id).await {
            metrics::record_publish_failure();
            warn!(video_id, error = %e, "Failed to publish viewed event");
        }
    }
}

/// Declare the `viewed` fanout exchange, durable, create-if-absent.
pub(crate) async fn declare_viewed_exchange(channel: &Channel) -> Result<(), BusError> {
    channel
        .exchange_declare(
            VIEWED_EXCHANGE,
            ExchangeKind::Fanout,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| {
            BusError::Channel(format!(
                "Failed to declare exchange {VIEWED_EXCHANGE}: {e}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_fire_and_forget() {
        let config = PublisherConfig::default();
        assert!(!config.confirm_delivery);
    }
}
