//! Playback engine abstraction
//!
//! The recorder never decodes audio itself. It drives a [`PlaybackEngine`]
//! and reads its clock. In the HTTP service the engine is the browser's audio
//! element, mirrored server-side by [`ReportedPlayback`] from the events the
//! page forwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Playback start failures
///
/// All of these are transient and user-visible; the caller may retry.
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum PlaybackError {
    /// No playable audio locator for the song
    #[error("No audio source available")]
    SourceUnavailable,

    /// The browser refused to start without a user gesture
    #[error("Playback not allowed: {0}")]
    NotAllowed(String),

    /// The resource could not be decoded
    #[error("Audio could not be decoded: {0}")]
    Decode(String),

    #[error("Playback failed: {0}")]
    Other(String),
}

impl PlaybackError {
    /// Map a browser `DOMException` name onto a playback error
    pub fn from_dom_exception(name: Option<&str>, message: impl Into<String>) -> Self {
        let message = message.into();
        match name {
            Some("NotAllowedError") => PlaybackError::NotAllowed(message),
            Some("NotSupportedError") => PlaybackError::Decode(message),
            Some("MEDIA_ERR_SRC_NOT_SUPPORTED") | Some("MEDIA_ERR_NETWORK") => {
                PlaybackError::SourceUnavailable
            }
            Some("MEDIA_ERR_DECODE") => PlaybackError::Decode(message),
            _ => PlaybackError::Other(message),
        }
    }
}

/// Audio engine driven by the recorder while it records
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Start or resume playback
    ///
    /// Resolves once audio is actually playing.
    async fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    /// Current position in seconds
    fn current_time(&self) -> f64;

    /// Seek
    fn set_current_time(&mut self, seconds: f64);
}

/// Event forwarded by the page from its `<audio>` element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PlaybackEvent {
    /// `play()` resolved
    Play {
        #[serde(default)]
        position: Option<f64>,
    },
    Pause {
        #[serde(default)]
        position: Option<f64>,
    },
    TimeUpdate { position: f64 },
    Seeked { position: f64 },
    Ended {
        #[serde(default)]
        position: Option<f64>,
    },
    /// `play()` rejected or the element fired `error`
    Error {
        #[serde(default)]
        name: Option<String>,
        message: String,
    },
}

/// What an applied event did to the play/pause state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTransition {
    /// Paused → playing
    Started,
    /// Playing → paused
    Stopped,
    Unchanged,
}

/// Server-side mirror of the browser's audio element
#[derive(Debug, Clone)]
pub struct ReportedPlayback {
    source: Option<String>,
    paused: bool,
    position: f64,
}

impl ReportedPlayback {
    /// Mirror for an element loaded with `source` (None = nothing playable)
    pub fn new(source: Option<String>) -> Self {
        Self {
            source,
            paused: true,
            position: 0.0,
        }
    }

    /// Apply a reported event
    ///
    /// `Error` leaves the element paused and returns the failure so the
    /// caller can surface it.
    pub fn apply(&mut self, event: &PlaybackEvent) -> Result<PlaybackTransition, PlaybackError> {
        let was_paused = self.paused;
        match event {
            PlaybackEvent::Play { position } => {
                if self.source.is_none() {
                    return Err(PlaybackError::SourceUnavailable);
                }
                self.update_position(*position);
                self.paused = false;
            }
            PlaybackEvent::Pause { position } | PlaybackEvent::Ended { position } => {
                self.update_position(*position);
                self.paused = true;
            }
            PlaybackEvent::TimeUpdate { position } | PlaybackEvent::Seeked { position } => {
                self.update_position(Some(*position));
            }
            PlaybackEvent::Error { name, message } => {
                self.paused = true;
                return Err(PlaybackError::from_dom_exception(name.as_deref(), message.clone()));
            }
        }

        debug!(paused = self.paused, position = self.position, "Playback mirror updated");

        Ok(match (was_paused, self.paused) {
            (true, false) => PlaybackTransition::Started,
            (false, true) => PlaybackTransition::Stopped,
            _ => PlaybackTransition::Unchanged,
        })
    }

    fn update_position(&mut self, position: Option<f64>) {
        if let Some(position) = position.filter(|p| p.is_finite()) {
            self.position = position.max(0.0);
        }
    }
}

#[async_trait]
impl PlaybackEngine for ReportedPlayback {
    async fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.is_none() {
            return Err(PlaybackError::SourceUnavailable);
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.update_position(Some(seconds));
    }
}
