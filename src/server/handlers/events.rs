//! SSE relay for the progress bus, grounded in
//! `original_source/api/routes/jobs.py`'s `job_stream`: subscribe once per
//! connection, forward each event as a `data:` frame, and let axum's SSE
//! keep-alive cover the "emit a comment on idle" requirement (spec.md §4.4)
//! instead of hand-rolling the timer the original uses.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

use crate::error::AppError;
use crate::server::AppState;

pub async fn stream(State(state): State<AppState>) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let events = state.progress.subscribe_stream().await?;
    let stream = events.map(|event| {
        let data = serde_json::to_string(&event).unwrap_or_default();
        Ok(Event::default().data(data))
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keepalive")))
}
