//! Event types for the text chunk creation workflow
//!
//! Every state transition of a creation session is published on an
//! [`EventBus`]. Display layers subscribe and re-render; the CLI logs them.
//! Emission is lossy: a session with no listeners behaves identically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Entry mode as reported in events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryModeKind {
    Manual,
    File,
}

impl std::fmt::Display for EntryModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryModeKind::Manual => write!(f, "manual"),
            EntryModeKind::File => write!(f, "file"),
        }
    }
}

/// Creation workflow events
///
/// All variants carry the originating session id and a UTC timestamp so a
/// consumer watching several sessions can tell them apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CreationEvent {
    /// Operator toggled the entry mode; draft and chunk identity were reset
    ModeChanged {
        session_id: Uuid,
        old_mode: EntryModeKind,
        new_mode: EntryModeKind,
        timestamp: DateTime<Utc>,
    },

    /// All three reference collections arrived
    ReferenceDataLoaded {
        session_id: Uuid,
        authors: usize,
        titles: usize,
        publishers: usize,
        timestamp: DateTime<Utc>,
    },

    /// Reference load failed; the form stays disabled
    ReferenceDataFailed {
        session_id: Uuid,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// File upload dispatched
    IngestionStarted {
        session_id: Uuid,
        /// Ingestion attempt sequence number
        seq: u64,
        file_name: String,
        timestamp: DateTime<Utc>,
    },

    /// Server created the draft chunk and extracted metadata was merged
    IngestionCompleted {
        session_id: Uuid,
        seq: u64,
        chunk_id: i64,
        timestamp: DateTime<Utc>,
    },

    /// Upload or extraction failed; identity and draft were cleared
    IngestionFailed {
        session_id: Uuid,
        seq: u64,
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// A response arrived for a superseded attempt and was dropped
    IngestionDiscarded {
        session_id: Uuid,
        seq: u64,
        timestamp: DateTime<Utc>,
    },

    SubmissionStarted {
        session_id: Uuid,
        mode: EntryModeKind,
        timestamp: DateTime<Utc>,
    },

    SubmissionSucceeded {
        session_id: Uuid,
        mode: EntryModeKind,
        message: String,
        timestamp: DateTime<Utc>,
    },

    SubmissionFailed {
        session_id: Uuid,
        mode: EntryModeKind,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl CreationEvent {
    /// Session that produced this event
    pub fn session_id(&self) -> Uuid {
        match self {
            CreationEvent::ModeChanged { session_id, .. }
            | CreationEvent::ReferenceDataLoaded { session_id, .. }
            | CreationEvent::ReferenceDataFailed { session_id, .. }
            | CreationEvent::IngestionStarted { session_id, .. }
            | CreationEvent::IngestionCompleted { session_id, .. }
            | CreationEvent::IngestionFailed { session_id, .. }
            | CreationEvent::IngestionDiscarded { session_id, .. }
            | CreationEvent::SubmissionStarted { session_id, .. }
            | CreationEvent::SubmissionSucceeded { session_id, .. }
            | CreationEvent::SubmissionFailed { session_id, .. } => *session_id,
        }
    }

    /// Short variant name, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            CreationEvent::ModeChanged { .. } => "ModeChanged",
            CreationEvent::ReferenceDataLoaded { .. } => "ReferenceDataLoaded",
            CreationEvent::ReferenceDataFailed { .. } => "ReferenceDataFailed",
            CreationEvent::IngestionStarted { .. } => "IngestionStarted",
            CreationEvent::IngestionCompleted { .. } => "IngestionCompleted",
            CreationEvent::IngestionFailed { .. } => "IngestionFailed",
            CreationEvent::IngestionDiscarded { .. } => "IngestionDiscarded",
            CreationEvent::SubmissionStarted { .. } => "SubmissionStarted",
            CreationEvent::SubmissionSucceeded { .. } => "SubmissionSucceeded",
            CreationEvent::SubmissionFailed { .. } => "SubmissionFailed",
        }
    }
}

/// Broadcast channel for [`CreationEvent`]s
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CreationEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before lagging receivers
    ///   start dropping the oldest ones
    ///
    /// # Examples
    ///
    /// ```
    /// use tcm_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CreationEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CreationEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = CreationEvent::IngestionCompleted {
            session_id: Uuid::nil(),
            seq: 3,
            chunk_id: 42,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "IngestionCompleted");
        assert_eq!(json["seq"], 3);
        assert_eq!(json["chunk_id"], 42);
    }

    #[test]
    fn test_mode_kind_serializes_lowercase() {
        let event = CreationEvent::SubmissionStarted {
            session_id: Uuid::nil(),
            mode: EntryModeKind::File,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["mode"], "file");
        assert_eq!(event.kind(), "SubmissionStarted");
    }

    #[test]
    fn test_emit_lossy_without_subscribers() {
        let bus = EventBus::new(8);
        assert_eq!(bus.subscriber_count(), 0);

        // Must not panic or error
        bus.emit_lossy(CreationEvent::ReferenceDataFailed {
            session_id: Uuid::nil(),
            message: "network error".to_string(),
            timestamp: Utc::now(),
        });
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let session_id = Uuid::new_v4();

        bus.emit_lossy(CreationEvent::IngestionStarted {
            session_id,
            seq: 1,
            file_name: "notes.txt".to_string(),
            timestamp: Utc::now(),
        });
        bus.emit_lossy(CreationEvent::IngestionDiscarded {
            session_id,
            seq: 1,
            timestamp: Utc::now(),
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind(), "IngestionStarted");
        assert_eq!(second.kind(), "IngestionDiscarded");
        assert_eq!(second.session_id(), session_id);
    }
}
