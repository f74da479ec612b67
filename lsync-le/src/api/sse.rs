//! Server-Sent Events for sync workflow activity

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /api/events
///
/// Streams mode changes, captures, finished sessions and saved lyrics for
/// every browser session.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    lsync_common::sse::create_broadcast_sse_stream("lsync-le", state.events.subscribe())
}
