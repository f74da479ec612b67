//! HTTP API handlers for lsync-le

pub mod auth;
pub mod health;
pub mod sessions;
pub mod songs;
pub mod sse;

pub use auth::Privileged;
pub use health::health_routes;
pub use sessions::session_routes;
pub use songs::song_routes;
pub use sse::event_stream;
