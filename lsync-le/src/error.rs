//! HTTP error mapping for lsync-le

use crate::export::ExportError;
use crate::gate::GateError;
use crate::playback::PlaybackError;
use crate::recorder::RecorderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lsync_common::api::ErrorResponse;
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown browser session (404)
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Unknown song (404)
    #[error("Song not found: {0}")]
    SongNotFound(String),

    /// Wrong passcode (401)
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Gate not passed for this session (401)
    #[error("Session is locked")]
    Locked,

    /// Operation not valid in the current mode (409)
    #[error(transparent)]
    Recorder(RecorderError),

    /// Audio could not start (422)
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    /// Overwrite refused or failed; the export is returned for manual copy
    #[error("{source}")]
    Persist {
        source: ExportError,
        export: String,
    },

    #[error("Database error: {0}")]
    Common(#[from] lsync_common::Error),
}

impl From<RecorderError> for ApiError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::Playback(e) => ApiError::Playback(e),
            other => ApiError::Recorder(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) | ApiError::SongNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Gate(GateError::Mismatch) | ApiError::Locked => StatusCode::UNAUTHORIZED,
            ApiError::Gate(GateError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Recorder(_) => StatusCode::CONFLICT,
            ApiError::Playback(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Persist { source, .. } => match source {
                ExportError::NotPrivileged => StatusCode::FORBIDDEN,
                ExportError::NotConfirmed => StatusCode::BAD_REQUEST,
                ExportError::SongNotFound(_) => StatusCode::NOT_FOUND,
                ExportError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Common(lsync_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::SessionNotFound(_) => "SESSION_NOT_FOUND",
            ApiError::SongNotFound(_) => "SONG_NOT_FOUND",
            ApiError::Gate(GateError::Mismatch) => "PASSCODE_MISMATCH",
            ApiError::Gate(GateError::NotConfigured) => "PASSCODE_NOT_CONFIGURED",
            ApiError::Locked => "SESSION_LOCKED",
            ApiError::Recorder(_) => "INVALID_TRANSITION",
            ApiError::Playback(_) => "PLAYBACK_FAILED",
            ApiError::Persist { source, .. } => match source {
                ExportError::NotPrivileged => "FORBIDDEN",
                ExportError::NotConfirmed => "CONFIRMATION_REQUIRED",
                ExportError::SongNotFound(_) => "SONG_NOT_FOUND",
                ExportError::Store(_) => "PERSIST_FAILED",
            },
            ApiError::Common(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            ApiError::Persist { export, .. } => Some(json!({ "export": export })),
            ApiError::Recorder(RecorderError::InvalidTransition { from, action }) => {
                Some(json!({ "mode": from, "action": action }))
            }
            ApiError::Playback(err) => Some(json!({ "playback": err })),
            _ => None,
        };

        let body = match details {
            Some(details) => ErrorResponse::with_details(self.code(), self.to_string(), details),
            None => ErrorResponse::new(self.code(), self.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::SyncMode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Gate(GateError::Mismatch).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Persist {
                source: ExportError::NotPrivileged,
                export: String::new(),
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::SessionNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RecorderError::InvalidTransition {
                from: SyncMode::Intro,
                action: "capture"
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(RecorderError::Playback(PlaybackError::SourceUnavailable)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_persist_failure_keeps_export() {
        let err = ApiError::Persist {
            source: ExportError::Store(lsync_common::Error::Config("disk".into())),
            export: "[00:01.00]a".to_string(),
        };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "PERSIST_FAILED");
    }
}
