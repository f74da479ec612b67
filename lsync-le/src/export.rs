//! LRC-style export of captured lyric timings
//!
//! Output format, one entry per capture in capture order:
//!
//! ```text
//! [MM:SS.CC]line text
//! ```
//!
//! Entries are joined with `\n` and the block has no trailing newline.
//! Formatting never depends on locale.

use crate::recorder::Capture;
use lsync_common::db::songs::update_song;
use lsync_common::SongUpdate;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Only administrators can save synced lyrics")]
    NotPrivileged,

    #[error("Overwriting lyrics requires explicit confirmation")]
    NotConfirmed,

    #[error("Song not found: {0}")]
    SongNotFound(String),

    #[error("Failed to save lyrics: {0}")]
    Store(#[from] lsync_common::Error),
}

/// Format seconds as `MM:SS.CC`
///
/// The value is rounded to whole centiseconds (as `{:.2}` rounds it) before
/// it is split into minutes and seconds, so 59.999 becomes `01:00.00` and
/// never `00:60.00`.
/// Negative and non-finite values format as `00:00.00`. Minutes widen past
/// two digits instead of wrapping.
///
/// # Examples
///
/// ```
/// use lsync_le::export::format_timestamp;
///
/// assert_eq!(format_timestamp(5.2), "00:05.20");
/// assert_eq!(format_timestamp(60.0), "01:00.00");
/// assert_eq!(format_timestamp(754.321), "12:34.32");
/// ```
pub fn format_timestamp(seconds: f64) -> String {
    let centis = if seconds.is_finite() && seconds > 0.0 {
        // `{:.2}` rounds the stored value exactly; scaling first does not
        let rounded: f64 = format!("{:.2}", seconds).parse().unwrap_or(0.0);
        (rounded * 100.0).round() as u64
    } else {
        0
    };
    let minutes = centis / 6000;
    let rem = centis % 6000;
    format!("{:02}:{:02}.{:02}", minutes, rem / 100, rem % 100)
}

/// Serialize captures into the timed lyric block
///
/// # Examples
///
/// ```
/// use lsync_le::export::export;
/// use lsync_le::recorder::Capture;
///
/// let captures = vec![Capture::new(5.2, "hello"), Capture::new(12.75, "world")];
/// assert_eq!(export(&captures), "[00:05.20]hello\n[00:12.75]world");
/// ```
pub fn export(captures: &[Capture]) -> String {
    captures
        .iter()
        .map(|capture| format!("[{}]{}", format_timestamp(capture.timestamp), capture.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Overwrite a song's lyrics with an export
///
/// Privileged callers only, and only after the user confirmed the
/// destructive overwrite. The plain lyrics are not kept anywhere else.
pub async fn persist_export(
    pool: &SqlitePool,
    song_id: &str,
    export: &str,
    privileged: bool,
    confirmed: bool,
) -> Result<(), ExportError> {
    if !privileged {
        return Err(ExportError::NotPrivileged);
    }
    if !confirmed {
        return Err(ExportError::NotConfirmed);
    }

    match update_song(pool, song_id, &SongUpdate::lyrics(export)).await {
        Ok(true) => {
            info!(song_id, bytes = export.len(), "Saved synced lyrics");
            Ok(())
        }
        Ok(false) => {
            warn!(song_id, "Synced lyrics not saved: song no longer exists");
            Err(ExportError::SongNotFound(song_id.to_string()))
        }
        Err(e) => {
            warn!(song_id, "Synced lyrics not saved: {}", e);
            Err(ExportError::Store(e))
        }
    }
}

/// One line of previously exported lyrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedLine {
    pub timestamp: f64,
    pub text: String,
}

/// Read a timed lyric block back
///
/// Lines that do not start with a `[MM:SS.CC]` tag are skipped; blank lines
/// are ignored. Two-digit or three-digit fractions and tagless `[MM:SS]` are
/// accepted.
///
/// # Examples
///
/// ```
/// use lsync_le::export::parse_lrc;
///
/// let lines = parse_lrc("[00:05.20]hello\n[01:00.00]world");
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[1].timestamp, 60.0);
/// assert_eq!(lines[1].text, "world");
/// ```
pub fn parse_lrc(text: &str) -> Vec<TimedLine> {
    text.lines().filter_map(parse_lrc_line).collect()
}

/// True when every non-blank line carries a timestamp tag
pub fn is_synced(text: &str) -> bool {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty()).peekable();
    lines.peek().is_some() && lines.all(|line| parse_lrc_line(line).is_some())
}

fn parse_lrc_line(line: &str) -> Option<TimedLine> {
    let rest = line.strip_prefix('[')?;
    let (tag, text) = rest.split_once(']')?;
    let (minutes, seconds) = tag.split_once(':')?;

    if minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (whole, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (seconds, None),
    };
    if whole.len() != 2 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(fraction) = fraction {
        if !(1..=3).contains(&fraction.len()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let minutes: u64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    if seconds >= 60.0 {
        return None;
    }

    Some(TimedLine {
        timestamp: minutes as f64 * 60.0 + seconds,
        text: text.to_string(),
    })
}
