use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

use super::types::AppState;

/// `GET /api/stream` -- change-notification stream.
///
/// On connect a comment frame goes out immediately so idle proxies do not
/// time out the connection. Afterwards, every completed snapshot swap emits
/// one `event: sessions` frame with no payload; subscribers re-pull through
/// the read endpoints.
pub async fn stream_sessions(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut changed = state.service.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default().comment("connected"));
        loop {
            match changed.recv().await {
                Ok(()) => {
                    yield Ok(Event::default().event("sessions").data(""));
                }
                // Missed notifications collapse into one; the payload-free
                // contract makes that harmless.
                Err(RecvError::Lagged(_)) => {
                    yield Ok(Event::default().event("sessions").data(""));
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
