//! Wire-level event types shared by the streaming producer and every
//! consumer service.
//!
//! Producer and consumers deserialize the same structs, so the wire field
//! names live here and nowhere else.

use serde::{Deserialize, Serialize};

/// Name of the fanout exchange all viewed events pass through.
pub const VIEWED_EXCHANGE: &str = "viewed";

/// A single "this video was streamed to a client" notification.
///
/// On the wire: `{"videoId":"<id>","viewed":"viewed-<id>"}`. The producer
/// always fills both fields. The `default` attributes exist for the
/// consumer side: a payload missing `videoId` must decode to an empty
/// string (and be skipped by the handler) rather than fail
/// deserialization, and the `viewed` label is carried but never validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewedEvent {
    #[serde(rename = "videoId", default)]
    pub video_id: String,
    #[serde(default)]
    pub viewed: String,
}

impl ViewedEvent {
    /// Build the event the producer emits for `video_id`.
    pub fn new(video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        let viewed = format!("viewed-{video_id}");
        Self { video_id, viewed }
    }

    /// Serialize to the UTF-8 JSON bus payload.
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Decode a bus payload.
    pub fn from_bytes(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }
}
