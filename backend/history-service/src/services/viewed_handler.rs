//! Per-message business logic for the viewing-history consumer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};

use event_bus::{EventHandler, HandleOutcome};
use event_schema::ViewedEvent;

use super::ViewStore;
use crate::metrics;

/// Handles one viewed event: decode, validate, persist, report the
/// outcome. Every failure mode is contained here; the subscriber runtime
/// only ever sees the returned outcome, never an error.
pub struct ViewedEventHandler {
    store: Arc<dyn ViewStore>,
}

impl ViewedEventHandler {
    pub fn new(store: Arc<dyn ViewStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for ViewedEventHandler {
    async fn handle(&self, payload: &[u8]) -> HandleOutcome {
        let event = match ViewedEvent::from_bytes(payload) {
            Ok(event) => event,
            Err(e) => {
                error!(error = %e, "Failed to decode viewed event payload");
                return HandleOutcome::Failed;
            }
        };

        if event.video_id.is_empty() {
            warn!("Viewed event carries no videoId, skipping");
            return HandleOutcome::Skipped;
        }

        let viewed_at = Utc::now();
        match self.store.insert_record(&event.video_id, viewed_at).await {
            Ok(()) => {
                metrics::record_view_stored();
                info!(video_id = %event.video_id, "Stored view record");
                HandleOutcome::Stored
            }
            Err(e) => {
                error!(
                    video_id = %event.video_id,
                    error = %e,
                    "Failed to store view record"
                );
                HandleOutcome::Failed
            }
        }
    }
}
