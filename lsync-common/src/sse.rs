//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE implementation for lsync services.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// An event that can be sent over SSE
pub trait SseEvent: Serialize + Clone + Send + 'static {
    /// SSE `event:` field
    fn event_type(&self) -> &'static str;
}

/// Stream broadcast events to one SSE client
///
/// Sends `ConnectionStatus: connected` first, then every event received on
/// `rx` serialized as JSON. A lagging client skips the dropped events and
/// keeps streaming.
///
/// # Example
/// ```rust,ignore
/// pub async fn event_stream(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     lsync_common::sse::create_broadcast_sse_stream("lsync-le", state.events.subscribe())
/// }
/// ```
pub fn create_broadcast_sse_stream<T: SseEvent>(
    service_name: &'static str,
    mut rx: broadcast::Receiver<T>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    match Event::default().event(event.event_type()).json_data(&event) {
                        Ok(sse_event) => yield Ok(sse_event),
                        Err(e) => warn!("SSE: failed to serialize event: {}", e),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("SSE: {} client lagged, skipped {} events", service_name, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("SSE: {} event channel closed", service_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
