//! lsync-le library - Lyric Editor module
//!
//! Time-syncs plain song lyrics against playback: a passcode gate, a
//! recording workflow that pairs each lyric line with the playback time at a
//! key press, and an LRC-style export that admins can save over the song.

use axum::Router;
use lsync_common::api::AdminToken;
use lsync_common::config::ServiceConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod events;
pub mod export;
pub mod gate;
pub mod playback;
pub mod recorder;
pub mod script;
pub mod sessions;

pub use crate::error::{ApiError, ApiResult};

use crate::events::EventBus;
use crate::sessions::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Song catalog
    pub db: SqlitePool,
    /// Live browser sessions (gate flag + workflow)
    pub sessions: SessionStore,
    pub events: EventBus,
    /// Privilege oracle
    pub admin_token: Arc<AdminToken>,
    /// Shared sync passcode (empty = only admins can enter)
    pub sync_passcode: Arc<str>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &ServiceConfig) -> Self {
        Self {
            db,
            sessions: SessionStore::new(Duration::from_secs(config.idle_session_secs)),
            events: EventBus::new(config.event_capacity),
            admin_token: Arc::new(AdminToken::new(config.admin_token.as_deref())),
            sync_passcode: Arc::from(config.sync_passcode.as_str()),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::health_routes())
        .merge(api::song_routes())
        .merge(api::session_routes())
        .route("/api/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
