//! Database models

use serde::{Deserialize, Serialize};

/// Catalog song record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    /// Plain-text lyrics, one line per text line (may be empty)
    pub lyrics: String,
    pub audio_url: Option<String>,
    pub fallback_audio_url: Option<String>,
    /// Visible to non-admin users in the sync song list
    pub sync_enabled: bool,
    pub updated_at: Option<String>,
}

impl Song {
    /// Create a song with a fresh id
    pub fn new(title: impl Into<String>, lyrics: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            lyrics: lyrics.into(),
            audio_url: None,
            fallback_audio_url: None,
            sync_enabled: true,
            updated_at: None,
        }
    }

    /// First non-empty audio locator (primary, then fallback)
    pub fn playable_url(&self) -> Option<&str> {
        [&self.audio_url, &self.fallback_audio_url]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|url| !url.trim().is_empty())
    }
}

/// Partial song update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub lyrics: Option<String>,
    pub sync_enabled: Option<bool>,
}

impl SongUpdate {
    /// Update that only replaces the lyrics
    pub fn lyrics(lyrics: impl Into<String>) -> Self {
        Self {
            lyrics: Some(lyrics.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.lyrics.is_none() && self.sync_enabled.is_none()
    }
}
