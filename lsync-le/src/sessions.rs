//! Browser session store
//!
//! Each browser session owns its gate flag and its workflow. Ending the
//! session (DELETE, idle expiry or process restart) drops both, so the next
//! session starts locked at INTRO.

use crate::gate::SessionGate;
use crate::playback::{PlaybackEngine, ReportedPlayback};
use crate::recorder::{Capture, CurrentLine, SyncMode, SyncRecorder};
use chrono::{DateTime, Utc};
use lsync_common::Song;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Per-browser workflow context
pub struct BrowserSession {
    pub id: Uuid,
    pub gate: SessionGate,
    pub recorder: SyncRecorder<ReportedPlayback>,
    /// Song picked through `begin` while the gate was still locked
    pub pending_song: Option<Song>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl BrowserSession {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            gate: SessionGate::new(),
            recorder: SyncRecorder::new(),
            pending_song: None,
            created_at: now,
            last_active: now,
        }
    }

    /// Snapshot for API responses
    pub fn view(&self, privileged: bool) -> SessionView {
        let recorder = &self.recorder;
        let finished = recorder.finished();
        SessionView {
            session_id: self.id,
            mode: recorder.mode(),
            unlocked: self.gate.is_unlocked(privileged),
            privileged,
            song_id: recorder.song_id().map(str::to_string),
            pending_song_id: self.pending_song.as_ref().map(|s| s.id.clone()),
            line_index: recorder.line_index(),
            script_len: recorder
                .script()
                .map(|s| s.len())
                .or_else(|| finished.map(|f| f.script_len)),
            current_line: recorder.current_line(),
            paused: recorder.is_paused(),
            position: recorder.engine().map(|e| e.current_time()),
            captures: recorder.captures().to_vec(),
            export: finished.map(|f| f.export.clone()),
            created_at: self.created_at,
        }
    }

    fn is_idle(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_active)
            .to_std()
            .map(|idle| idle > ttl)
            .unwrap_or(false)
    }
}

/// Serializable session state
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub mode: SyncMode,
    pub unlocked: bool,
    pub privileged: bool,
    pub song_id: Option<String>,
    /// Selected automatically once the gate opens
    pub pending_song_id: Option<String>,
    /// -1 before the first play; absent outside PRELUDE/RECORDING
    pub line_index: Option<i64>,
    pub script_len: Option<usize>,
    pub current_line: Option<CurrentLine>,
    pub paused: bool,
    pub position: Option<f64>,
    pub captures: Vec<Capture>,
    /// Present in DONE
    pub export: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// All live browser sessions
///
/// Sessions untouched for longer than `idle_ttl` expire: they are swept on
/// every `create` and treated as unknown when looked up.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, BrowserSession>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Start a locked session at INTRO
    pub async fn create(&self, privileged: bool) -> SessionView {
        let session = BrowserSession::new();
        let view = session.view(privileged);
        let mut sessions = self.sessions.write().await;
        self.prune_idle_locked(&mut sessions);
        sessions.insert(session.id, session);
        info!(session_id = %view.session_id, "Browser session created");
        view
    }

    /// Run `f` with exclusive access to one session
    ///
    /// Returns `None` for unknown or expired ids. Operations on the same
    /// session are serialized by the store lock.
    pub async fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut BrowserSession) -> R,
    ) -> Option<R> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        if sessions.get(&id)?.is_idle(self.idle_ttl, now) {
            sessions.remove(&id);
            info!(session_id = %id, "Browser session expired");
            return None;
        }
        let session = sessions.get_mut(&id)?;
        session.last_active = now;
        Some(f(session))
    }

    pub async fn view(&self, id: Uuid, privileged: bool) -> Option<SessionView> {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|s| !s.is_idle(self.idle_ttl, now))
            .map(|s| s.view(privileged))
    }

    /// Drop every expired session; returns how many were removed
    pub async fn prune_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.prune_idle_locked(&mut sessions)
    }

    fn prune_idle_locked(&self, sessions: &mut HashMap<Uuid, BrowserSession>) -> usize {
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = !session.is_idle(self.idle_ttl, now);
            if !keep {
                info!(session_id = %id, "Browser session expired");
            }
            keep
        });
        before - sessions.len()
    }

    /// End a session; returns false when it did not exist
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Browser session ended");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
