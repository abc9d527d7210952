//! Queue change events pushed to every viewer.
//!
//! Each committed mutation produces exactly one [`QueueEvent`]. The enum is
//! closed, so every consumer handles every kind explicitly. Wire shape:
//!
//! ```json
//! {"type": "point", "data": {"id": 1, "name": "...", "username": "...", "type": "point"}, "queueId": 1}
//! {"type": "delete", "id": 1, "queueId": 1, "dismisser": "..."}
//! ```

use crate::models::{Entry, EntryId, EntryKind, QueueId, QueueSnapshot};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// A child queue was created
    #[serde(rename = "new-queue")]
    NewQueue {
        queue: QueueSnapshot,
        #[serde(rename = "moveViewers")]
        move_viewers: bool,
    },

    /// Someone joined the points list
    #[serde(rename = "point")]
    Point {
        data: Entry,
        #[serde(rename = "queueId")]
        queue_id: QueueId,
    },

    /// Someone joined the clarifiers list
    #[serde(rename = "clarifier")]
    Clarifier {
        data: Entry,
        #[serde(rename = "queueId")]
        queue_id: QueueId,
    },

    /// An entry was removed; `dismisser` is who removed it, not who wrote it
    #[serde(rename = "delete")]
    Delete {
        id: EntryId,
        #[serde(rename = "queueId")]
        queue_id: QueueId,
        dismisser: String,
    },

    /// A queue was retitled
    #[serde(rename = "topic")]
    Topic {
        topic: String,
        #[serde(rename = "queueId")]
        queue_id: QueueId,
    },
}

impl QueueEvent {
    pub fn entry_added(entry: Entry, queue_id: QueueId) -> Self {
        match entry.kind {
            EntryKind::Point => Self::Point {
                data: entry,
                queue_id,
            },
            EntryKind::Clarifier => Self::Clarifier {
                data: entry,
                queue_id,
            },
        }
    }

    /// Event type as it appears in the `type` field
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewQueue { .. } => "new-queue",
            Self::Point { .. } => "point",
            Self::Clarifier { .. } => "clarifier",
            Self::Delete { .. } => "delete",
            Self::Topic { .. } => "topic",
        }
    }

    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Sending half of the ordered event stream.
///
/// Publishing never blocks; events reach the dispatcher in publish order.
#[derive(Clone)]
pub struct EventPublisher {
    tx: UnboundedSender<QueueEvent>,
}

impl EventPublisher {
    pub fn publish(&self, event: QueueEvent) {
        let event_type = event.event_type();
        if self.tx.send(event).is_err() {
            tracing::warn!(event_type, "event dispatcher is gone, dropping event");
        }
    }
}

/// Creates the publisher and the receiver the dispatcher drains.
pub fn event_channel() -> (EventPublisher, UnboundedReceiver<QueueEvent>) {
    let (tx, rx) = unbounded_channel();
    (EventPublisher { tx }, rx)
}
