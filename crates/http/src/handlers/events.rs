use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::Stream;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

const VOTE_UPDATE_EVENT: &str = "voteUpdate";

/// Live `voteUpdate` events. No replay: only updates published after the
/// subscription are delivered.
pub async fn sse_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.broadcaster.subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(update) => match Event::default().event(VOTE_UPDATE_EVENT).json_data(&update) {
                    Ok(event) => yield Ok(event),
                    Err(e) => tracing::warn!("Failed to encode vote update: {}", e),
                },
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("SSE client lagged by {} messages", n);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
