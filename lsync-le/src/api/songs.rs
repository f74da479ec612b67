//! Read-only catalog browsing

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use lsync_common::db::{get_song_by_id, list_songs};
use lsync_common::Song;
use serde::Serialize;

use super::auth::Privileged;
use crate::error::{ApiError, ApiResult};
use crate::export::{is_synced, parse_lrc, TimedLine};
use crate::recorder::selectable_songs;
use crate::script::LyricScript;
use crate::AppState;

/// Song as listed in the catalog
#[derive(Debug, Serialize)]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub sync_enabled: bool,
    /// Lyrics already carry timestamps
    pub synced: bool,
    pub line_count: usize,
    pub has_audio: bool,
}

impl From<&Song> for SongSummary {
    fn from(song: &Song) -> Self {
        Self {
            id: song.id.clone(),
            title: song.title.clone(),
            sync_enabled: song.sync_enabled,
            synced: is_synced(&song.lyrics),
            line_count: LyricScript::from_lyrics(&song.lyrics).len(),
            has_audio: song.playable_url().is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SongDetail {
    #[serde(flatten)]
    pub song: Song,
    pub synced: bool,
    /// Parsed timings when `synced`
    pub timed_lines: Vec<TimedLine>,
}

/// Fetch a song the caller is allowed to sync
///
/// Disabled songs look missing to non-privileged callers.
pub async fn load_selectable_song(state: &AppState, id: &str, privileged: bool) -> ApiResult<Song> {
    match get_song_by_id(&state.db, id).await? {
        Some(song) if privileged || song.sync_enabled => Ok(song),
        _ => Err(ApiError::SongNotFound(id.to_string())),
    }
}

/// Songs visible to the caller
pub async fn visible_songs(state: &AppState, privileged: bool) -> ApiResult<Vec<SongSummary>> {
    let songs = selectable_songs(list_songs(&state.db).await?, privileged);
    Ok(songs.iter().map(SongSummary::from).collect())
}

/// GET /api/songs
pub async fn list(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
) -> ApiResult<Json<Vec<SongSummary>>> {
    Ok(Json(visible_songs(&state, privileged).await?))
}

/// GET /api/songs/:id
pub async fn detail(
    State(state): State<AppState>,
    Privileged(privileged): Privileged,
    Path(id): Path<String>,
) -> ApiResult<Json<SongDetail>> {
    let song = load_selectable_song(&state, &id, privileged).await?;
    let synced = is_synced(&song.lyrics);
    let timed_lines = if synced { parse_lrc(&song.lyrics) } else { Vec::new() };

    Ok(Json(SongDetail {
        song,
        synced,
        timed_lines,
    }))
}

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list))
        .route("/api/songs/:id", get(detail))
}
