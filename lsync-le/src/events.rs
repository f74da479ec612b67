//! Sync workflow events broadcast to SSE subscribers

use crate::recorder::{Capture, SyncMode};
use chrono::{DateTime, Utc};
use lsync_common::sse::SseEvent;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted by sync sessions
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SyncEvent {
    /// Session moved to another workflow mode
    ModeChanged {
        session_id: Uuid,
        from: SyncMode,
        to: SyncMode,
        timestamp: DateTime<Utc>,
    },

    /// First playback start armed the cursor
    SyncArmed {
        session_id: Uuid,
        song_id: String,
        timestamp: DateTime<Utc>,
    },

    LineCaptured {
        session_id: Uuid,
        song_id: String,
        line_index: usize,
        capture: Capture,
        timestamp: DateTime<Utc>,
    },

    SyncFinished {
        session_id: Uuid,
        song_id: String,
        captured: usize,
        script_len: usize,
        timestamp: DateTime<Utc>,
    },

    /// Export written over the song's lyrics
    LyricsSaved {
        song_id: String,
        timestamp: DateTime<Utc>,
    },

    SessionClosed {
        session_id: Uuid,
        timestamp: DateTime<Utc>,
    },
}

impl SseEvent for SyncEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SyncEvent::ModeChanged { .. } => "ModeChanged",
            SyncEvent::SyncArmed { .. } => "SyncArmed",
            SyncEvent::LineCaptured { .. } => "LineCaptured",
            SyncEvent::SyncFinished { .. } => "SyncFinished",
            SyncEvent::LyricsSaved { .. } => "LyricsSaved",
            SyncEvent::SessionClosed { .. } => "SessionClosed",
        }
    }
}

/// Broadcast bus for [`SyncEvent`]s
///
/// Old events are dropped for slow subscribers once `capacity` is reached.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Emit, ignoring the case where nobody is listening
    pub fn emit_lossy(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
