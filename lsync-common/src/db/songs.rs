//! Song catalog operations
//!
//! The catalog is owned by the site's content subsystem. lsync reads songs and
//! performs partial updates (the timed-lyrics overwrite).

use crate::db::models::{Song, SongUpdate};
use crate::Result;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

const SONG_COLUMNS: &str =
    "id, title, lyrics, audio_url, fallback_audio_url, sync_enabled, updated_at";

fn song_from_row(row: &SqliteRow) -> Song {
    let sync_enabled: i64 = row.get("sync_enabled");
    Song {
        id: row.get("id"),
        title: row.get("title"),
        lyrics: row.get("lyrics"),
        audio_url: row.get("audio_url"),
        fallback_audio_url: row.get("fallback_audio_url"),
        sync_enabled: sync_enabled != 0,
        updated_at: row.get("updated_at"),
    }
}

/// Insert or replace a song
pub async fn save_song(pool: &SqlitePool, song: &Song) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO songs (
            id, title, lyrics, audio_url, fallback_audio_url, sync_enabled,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            lyrics = excluded.lyrics,
            audio_url = excluded.audio_url,
            fallback_audio_url = excluded.fallback_audio_url,
            sync_enabled = excluded.sync_enabled,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(&song.id)
    .bind(&song.title)
    .bind(&song.lyrics)
    .bind(&song.audio_url)
    .bind(&song.fallback_audio_url)
    .bind(song.sync_enabled as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one song by id
pub async fn get_song_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Song>> {
    let query = format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS);
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

    Ok(row.as_ref().map(song_from_row))
}

/// List every song, ordered by title
///
/// Filtering by `sync_enabled` is the caller's job: admins see all songs.
pub async fn list_songs(pool: &SqlitePool) -> Result<Vec<Song>> {
    let query = format!("SELECT {} FROM songs ORDER BY title COLLATE NOCASE, id", SONG_COLUMNS);
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    Ok(rows.iter().map(song_from_row).collect())
}

/// Apply a partial update
///
/// Returns `false` when no song has that id. An empty update is a no-op that
/// still reports whether the song exists.
pub async fn update_song(pool: &SqlitePool, id: &str, update: &SongUpdate) -> Result<bool> {
    if update.is_empty() {
        return Ok(get_song_by_id(pool, id).await?.is_some());
    }

    let result = sqlx::query(
        r#"
        UPDATE songs SET
            title = COALESCE(?, title),
            lyrics = COALESCE(?, lyrics),
            sync_enabled = COALESCE(?, sync_enabled),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(&update.title)
    .bind(&update.lyrics)
    .bind(update.sync_enabled.map(|enabled| enabled as i64))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
