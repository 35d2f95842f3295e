use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod publisher;
pub use publisher::EventPublisher;

use crate::sensor::{AttributeKind, TagSnapshot};

/// Domain events emitted toward the host-controller integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// A tag was discovered at the tag manager and a device was created
    TagDiscovered {
        tag_id: u32,
        address: String,
        tag_type: u16,
        timestamp: DateTime<Utc>,
    },

    /// One attribute of a tag changed value
    AttributeUpdated {
        tag_id: u32,
        address: String,
        kind: AttributeKind,
        value: f64,
        timestamp: DateTime<Utc>,
    },

    /// Full attribute snapshot pushed to the host display
    SnapshotReported {
        snapshot: TagSnapshot,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Create a TagDiscovered event
    pub fn tag_discovered(tag_id: u32, address: impl Into<String>, tag_type: u16) -> Self {
        Self::TagDiscovered {
            tag_id,
            address: address.into(),
            tag_type,
            timestamp: Utc::now(),
        }
    }

    /// Create an AttributeUpdated event
    pub fn attribute_updated(
        tag_id: u32,
        address: impl Into<String>,
        kind: AttributeKind,
        value: f64,
    ) -> Self {
        Self::AttributeUpdated {
            tag_id,
            address: address.into(),
            kind,
            value,
            timestamp: Utc::now(),
        }
    }

    /// Create a SnapshotReported event
    pub fn snapshot_reported(snapshot: TagSnapshot) -> Self {
        Self::SnapshotReported {
            snapshot,
            timestamp: Utc::now(),
        }
    }

    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::TagDiscovered { timestamp, .. } => *timestamp,
            Self::AttributeUpdated { timestamp, .. } => *timestamp,
            Self::SnapshotReported { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &str {
        match self {
            Self::TagDiscovered { .. } => "TagDiscovered",
            Self::AttributeUpdated { .. } => "AttributeUpdated",
            Self::SnapshotReported { .. } => "SnapshotReported",
        }
    }
}
