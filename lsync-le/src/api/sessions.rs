//! Sync workflow endpoints
//!
//! Every operation runs under the session store lock, so events for one
//! browser session are applied strictly in order.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::auth::Privileged;
use super::songs::{load_selectable_song, visible_songs, SongSummary};
use crate::error::{ApiError, ApiResult};
use crate::events::SyncEvent;
use crate::export::persist_export;
use crate::playback::{PlaybackEvent, ReportedPlayback};
use crate::recorder::{CaptureOutcome, Cursor, RecorderError, SyncMode};
use crate::sessions::{BrowserSession, SessionView};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct SongRequest {
    pub song_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CaptureRequest {
    /// Audio element time at the key press, if the page sends it
    #[serde(default)]
    pub position: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PersistRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    #[serde(flatten)]
    pub outcome: CaptureOutcome,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct PersistResponse {
    pub song_id: String,
    pub saved: bool,
    pub export: String,
}

/// Run one workflow step on a session and broadcast the mode change
async fn step<R>(
    state: &AppState,
    session_id: Uuid,
    f: impl FnOnce(&mut BrowserSession) -> ApiResult<R>,
) -> ApiResult<R> {
    let (from, to, result) = state
        .sessions
        .with_session(session_id, |session| {
            let from = session.recorder.mode();
            let result = f(session);
            (from, session.recorder.mode(), result)
        })
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;

    if from != to {
        state.events.emit_lossy(SyncEvent::ModeChanged {
            session_id,
            from,
            to,
            timestamp: Utc::now(),
        });
    }
    result
}

fn engine_for(song: &lsync_common::Song) -> ReportedPlayback {
    ReportedPlayback::new(song.playable_url().map(str::to_string))
}

fn invalid(from: SyncMode, action: &'static str) -> ApiError {
    ApiError::Recorder(RecorderError::InvalidTransition { from, action })
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
) -> (StatusCode, Json<SessionView>) {
    let view = state.sessions.create(privileged).await;
    (StatusCode::CREATED, Json(view))
}

/// GET /api/sessions/:sid
pub async fn get_session(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    state
        .sessions
        .view(session_id, privileged)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))
}

/// DELETE /api/sessions/:sid
///
/// Ends the browser session; its gate flag and any workflow go with it.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !state.sessions.remove(session_id).await {
        return Err(ApiError::SessionNotFound(session_id.to_string()));
    }
    state.events.emit_lossy(SyncEvent::SessionClosed {
        session_id,
        timestamp: Utc::now(),
    });
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:sid/enter
pub async fn enter(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    step(&state, session_id, |session| {
        let unlocked = session.gate.is_unlocked(privileged);
        session.recorder.enter(unlocked)?;
        Ok(Json(session.view(privileged)))
    })
    .await
}

/// POST /api/sessions/:sid/unlock
///
/// Verifies the passcode for this browser session. In UNLOCK a match moves
/// on to SELECT, and on to PRELUDE when `begin` left a song waiting.
pub async fn unlock(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
    Json(request): Json<UnlockRequest>,
) -> ApiResult<Json<SessionView>> {
    let passcode = state.sync_passcode.clone();
    step(&state, session_id, |session| {
        if !privileged {
            session.gate.verify(&request.code, &passcode)?;
        }
        if session.recorder.mode() == SyncMode::Unlock {
            session.recorder.gate_passed()?;
            if let Some(song) = session.pending_song.take() {
                session.recorder.select(&song, engine_for(&song))?;
            }
        }
        Ok(Json(session.view(privileged)))
    })
    .await
}

/// POST /api/sessions/:sid/begin
///
/// "Sync this song" entry point from the catalog. Enters the workflow and
/// selects the song in one go when the session is unlocked; otherwise the
/// session stops at UNLOCK with the song pending until `unlock` succeeds.
pub async fn begin(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SongRequest>,
) -> ApiResult<Json<SessionView>> {
    let song = load_selectable_song(&state, &request.song_id, privileged).await?;

    step(&state, session_id, |session| {
        match session.recorder.mode() {
            SyncMode::Intro => {
                let unlocked = session.gate.is_unlocked(privileged);
                session.recorder.enter(unlocked)?;
            }
            SyncMode::Unlock | SyncMode::Select => {}
            other => return Err(invalid(other, "begin sync")),
        }

        if session.recorder.mode() == SyncMode::Select {
            session.recorder.select(&song, engine_for(&song))?;
            session.pending_song = None;
        } else {
            session.pending_song = Some(song);
        }
        Ok(Json(session.view(privileged)))
    })
    .await
}

/// GET /api/sessions/:sid/songs
pub async fn songs(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SongSummary>>> {
    let unlocked = state
        .sessions
        .with_session(session_id, |session| session.gate.is_unlocked(privileged))
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
    if !unlocked {
        return Err(ApiError::Locked);
    }

    Ok(Json(visible_songs(&state, privileged).await?))
}

/// POST /api/sessions/:sid/select
pub async fn select(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SongRequest>,
) -> ApiResult<Json<SessionView>> {
    let song = load_selectable_song(&state, &request.song_id, privileged).await?;

    step(&state, session_id, |session| {
        if !session.gate.is_unlocked(privileged) {
            return Err(ApiError::Locked);
        }
        session.recorder.select(&song, engine_for(&song))?;
        session.pending_song = None;
        Ok(Json(session.view(privileged)))
    })
    .await
}

/// POST /api/sessions/:sid/acknowledge
pub async fn acknowledge(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    step(&state, session_id, |session| {
        session.recorder.acknowledge()?;
        Ok(Json(session.view(privileged)))
    })
    .await
}

/// POST /api/sessions/:sid/playback
///
/// Mirrors the page's audio element. A failure reported by the page comes
/// back as 422 and leaves the session as it was.
pub async fn playback(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
    Json(event): Json<PlaybackEvent>,
) -> ApiResult<Json<SessionView>> {
    let (view, armed) = step(&state, session_id, |session| {
        let was_unarmed = session.recorder.cursor() == Some(Cursor::Unarmed);
        session.recorder.on_playback_event(&event)?;
        let armed = was_unarmed && session.recorder.cursor() == Some(Cursor::Armed(0));
        Ok((session.view(privileged), armed))
    })
    .await?;

    if armed {
        if let Some(song_id) = view.song_id.clone() {
            state.events.emit_lossy(SyncEvent::SyncArmed {
                session_id,
                song_id,
                timestamp: Utc::now(),
            });
        }
    }
    Ok(Json(view))
}

/// POST /api/sessions/:sid/capture
///
/// Ignored captures (paused, not started, end of script) still return 200
/// with `outcome: "ignored"`.
pub async fn capture(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
    request: Option<Json<CaptureRequest>>,
) -> ApiResult<Json<CaptureResponse>> {
    let Json(request) = request.unwrap_or_default();

    let response = step(&state, session_id, |session| {
        if let Some(position) = request.position {
            session.recorder.seek(position)?;
        }
        let outcome = session.recorder.capture()?;
        Ok(CaptureResponse {
            outcome,
            session: session.view(privileged),
        })
    })
    .await?;

    if let CaptureOutcome::Captured { line_index, capture } = &response.outcome {
        if let Some(song_id) = response.session.song_id.clone() {
            state.events.emit_lossy(SyncEvent::LineCaptured {
                session_id,
                song_id,
                line_index: *line_index,
                capture: capture.clone(),
                timestamp: Utc::now(),
            });
        }
    }
    Ok(Json(response))
}

/// POST /api/sessions/:sid/abandon
pub async fn abandon(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    step(&state, session_id, |session| {
        session.recorder.abandon()?;
        Ok(Json(session.view(privileged)))
    })
    .await
}

/// POST /api/sessions/:sid/finish
pub async fn finish(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let (view, finished) = step(&state, session_id, |session| {
        let finished = session.recorder.finish()?;
        Ok((session.view(privileged), finished))
    })
    .await?;

    state.events.emit_lossy(SyncEvent::SyncFinished {
        session_id,
        song_id: finished.song_id,
        captured: finished.captures.len(),
        script_len: finished.script_len,
        timestamp: Utc::now(),
    });
    Ok(Json(view))
}

/// POST /api/sessions/:sid/persist
///
/// Overwrites the song's lyrics with the export (admin + `confirm: true`).
/// On any failure the session stays in DONE and the error carries the export.
pub async fn persist(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
    request: Option<Json<PersistRequest>>,
) -> ApiResult<Json<PersistResponse>> {
    let Json(request) = request.unwrap_or_default();

    let (mode, finished) = state
        .sessions
        .with_session(session_id, |session| {
            (session.recorder.mode(), session.recorder.finished().cloned())
        })
        .await
        .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
    let finished = finished.ok_or_else(|| invalid(mode, "save lyrics"))?;

    persist_export(
        &state.db,
        &finished.song_id,
        &finished.export,
        privileged,
        request.confirm,
    )
    .await
    .map_err(|source| ApiError::Persist {
        source,
        export: finished.export.clone(),
    })?;

    info!(session_id = %session_id, song_id = %finished.song_id, "Export persisted");
    state.events.emit_lossy(SyncEvent::LyricsSaved {
        song_id: finished.song_id.clone(),
        timestamp: Utc::now(),
    });

    Ok(Json(PersistResponse {
        song_id: finished.song_id,
        saved: true,
        export: finished.export,
    }))
}

/// POST /api/sessions/:sid/reset
pub async fn reset(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    step(&state, session_id, |session| {
        session.recorder.reset();
        session.pending_song = None;
        Ok(Json(session.view(privileged)))
    })
    .await
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:sid", get(get_session).delete(delete_session))
        .route("/api/sessions/:sid/enter", post(enter))
        .route("/api/sessions/:sid/unlock", post(unlock))
        .route("/api/sessions/:sid/begin", post(begin))
        .route("/api/sessions/:sid/songs", get(songs))
        .route("/api/sessions/:sid/select", post(select))
        .route("/api/sessions/:sid/acknowledge", post(acknowledge))
        .route("/api/sessions/:sid/playback", post(playback))
        .route("/api/sessions/:sid/capture", post(capture))
        .route("/api/sessions/:sid/abandon", post(abandon))
        .route("/api/sessions/:sid/finish", post(finish))
        .route("/api/sessions/:sid/persist", post(persist))
        .route("/api/sessions/:sid/reset", post(reset))
}
