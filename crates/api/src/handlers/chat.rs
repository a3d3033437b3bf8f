//! Streamed chat turns.
//!
//! The handler composes the system instruction from the current rule set,
//! opens the completion stream, and hands it to a pump task that forwards
//! fragments into the response body. Errors before the first byte are
//! ordinary JSON errors; after that the body can only carry an in-band
//! marker and end.

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use frontdoor_core::chat::{sanitize_messages, with_system_prompt};
use frontdoor_core::prompt::build_system_prompt;
use frontdoor_llm::FragmentStream;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Appended to the body when the completion fails after streaming started.
pub const STREAM_ERROR_MARKER: &str = "\n[Stream error]\n";

/// Message for a request with no usable messages.
pub const EMPTY_MESSAGES: &str = "messages array is empty or invalid";

/// Fragments buffered between the pump task and the response body.
const CHANNEL_CAPACITY: usize = 32;

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// POST /api/chat
///
/// Body: `{ "messages": [{ "role": "...", "content": "..." }, ...] }`.
/// Malformed entries are dropped; a body with nothing left is rejected.
/// Responds with a `text/plain` stream of the assistant's reply.
pub async fn chat_turn(State(state): State<AppState>, body: Bytes) -> AppResult<Response> {
    let llm = state.llm.clone().ok_or(AppError::UpstreamNotConfigured)?;

    let payload: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    let messages = sanitize_messages(&payload["messages"]);
    if messages.is_empty() {
        return Err(AppError::BadRequest(EMPTY_MESSAGES.to_string()));
    }

    let rules = state.store.list().await?;
    let system_prompt = build_system_prompt(&rules, &state.config.fallback_contact);
    let message_count = messages.len();
    let conversation = with_system_prompt(system_prompt, messages);

    let fragments = llm.stream_chat(conversation).await?;

    tracing::info!(message_count, rule_count = rules.len(), "Chat stream opened");

    let (tx, rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    tokio::spawn(pump(fragments, tx, state.shutdown.clone()));

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
            (CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (X_ACCEL_BUFFERING, HeaderValue::from_static("no")),
        ],
        body,
    )
        .into_response())
}

/// Forward fragments until the completion ends, fails, the client goes
/// away, or the server shuts down.
///
/// Returning drops both `fragments` (aborting the upstream request) and
/// `tx` (ending the response body).
async fn pump(mut fragments: FragmentStream, tx: mpsc::Sender<String>, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = tx.closed() => {
                tracing::debug!("Chat client disconnected, aborting completion");
                return;
            }
            _ = shutdown.cancelled() => {
                tracing::debug!("Shutting down, ending chat stream");
                return;
            }
            next = fragments.next() => match next {
                Some(Ok(text)) => {
                    if tx.send(text).await.is_err() {
                        return;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Chat stream failed mid-response");
                    let _ = tx.send(STREAM_ERROR_MARKER.to_string()).await;
                    return;
                }
                None => {
                    tracing::debug!("Chat stream completed");
                    return;
                }
            },
        }
    }
}
