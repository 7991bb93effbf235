//! HTTP handler for the streaming endpoint.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use tapedeck_core::{ChatRequest, DocumentUpdate, RunText, StreamHandle};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamMap;

use super::convert::TransportContext;
use super::events::UiEvent;
use crate::error::ServerError;
use crate::state::AppState;

/// Handle a chat request.
///
/// Accepts POST with a [`ChatRequest`] body, returns an SSE stream of
/// [`UiEvent`]s.
pub async fn stream_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
    log::debug!(
        "{}: chat request with {} history entries",
        state.config.name(),
        request.chat_history.len()
    );

    let handle = state.config.invoke(request);
    let stream = ui_events(handle).map(|event| Ok::<_, Infallible>(to_sse_event(&event)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn to_sse_event(event: &UiEvent) -> Event {
    let json = serde_json::to_string(event).unwrap_or_else(|e| {
        serde_json::json!({
            "type": "RUN_ERROR",
            "message": format!("Failed to serialize event: {}", e)
        })
        .to_string()
    });
    Event::default().data(json)
}

enum Next {
    Document(Option<DocumentUpdate>),
    Text(String, RunText),
}

/// Flatten a [`StreamHandle`] into one ordered stream of wire events.
///
/// Document updates and run text are interleaved as they arrive. Every run's
/// text is complete (`TEXT_END`) before `DOCUMENT_END`, and the stream ends
/// with the completion outcome.
pub fn ui_events(handle: StreamHandle) -> impl Stream<Item = UiEvent> {
    let StreamHandle {
        mut document,
        runs,
        completion,
    } = handle;

    async_stream::stream! {
        let mut ctx = TransportContext::new();
        let mut texts: StreamMap<String, WatchStream<RunText>> = StreamMap::new();

        loop {
            let next = tokio::select! {
                biased;
                update = document.next() => Next::Document(update),
                Some((run_id, value)) = texts.next(), if !texts.is_empty() => {
                    Next::Text(run_id, value)
                }
            };

            match next {
                Next::Document(Some(update)) => {
                    if let DocumentUpdate::Append(fragment) = &update {
                        if let Some(run_id) = fragment.placeholder_run_id() {
                            match runs.subscribe(run_id) {
                                Some(subscription) => {
                                    texts.insert(run_id.to_string(), subscription.into_stream());
                                }
                                None => log::warn!("placeholder for unknown run {}", run_id),
                            }
                        }
                    }

                    let closed = update == DocumentUpdate::Closed;
                    for event in ctx.convert_update(&update, &runs) {
                        yield event;
                    }
                    if closed {
                        break;
                    }
                }
                Next::Document(None) => {
                    // Writer gone without closing; end the document ourselves.
                    log::warn!("document stream ended without a close");
                    for event in ctx.convert_update(&DocumentUpdate::Closed, &runs) {
                        yield event;
                    }
                    break;
                }
                Next::Text(run_id, value) => {
                    for event in ctx.convert_text(&run_id, &value) {
                        yield event;
                    }
                }
            }
        }

        match completion.await {
            Ok(output) => yield UiEvent::RunFinished { output },
            Err(e) => {
                log::error!("agent run failed: {}", e);
                yield UiEvent::RunError { message: e.to_string() };
            }
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
