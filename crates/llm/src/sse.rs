//! Server-sent event decoding for streamed chat completions.
//!
//! [`SseDecoder`] turns arbitrary byte chunks into complete `data:` payloads;
//! [`delta_content`] pulls the text out of one payload; [`fragments`] glues
//! both onto a byte stream.

use std::collections::VecDeque;

use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde_json::Value;

use crate::LlmError;

/// Payload that terminates an OpenAI-style event stream.
const DONE_MARKER: &str = "[DONE]";

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Incremental line decoder. Bytes may be split anywhere, including inside a
/// multi-byte character.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line(raw: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);

    // Comments, `event:`/`id:` fields and blank separators carry no text.
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim() == DONE_MARKER {
        Some(SseEvent::Done)
    } else if data.trim().is_empty() {
        None
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

/// Extract `choices[0].delta.content` from a chunk payload.
///
/// Returns `Ok(None)` for chunks that carry no text (role announcements,
/// reasoning deltas, finish markers). An `error` object in the payload is
/// reported as [`LlmError::Upstream`].
pub fn delta_content(data: &str) -> Result<Option<String>, LlmError> {
    let json: Value = serde_json::from_str(data)?;

    if let Some(error) = json.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(LlmError::Upstream(message));
    }

    let text = json["choices"]
        .get(0)
        .and_then(|c| c.get("delta"))
        .and_then(|d| d.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    Ok(text)
}

struct DecodeState<S> {
    body: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, LlmError>>,
    finished: bool,
}

impl<S> DecodeState<S> {
    /// Queue the outcome of one event. Returns `true` once the stream is over.
    fn accept(&mut self, event: SseEvent) -> bool {
        match event {
            SseEvent::Done => true,
            SseEvent::Data(data) => match delta_content(&data) {
                Ok(Some(text)) => {
                    self.pending.push_back(Ok(text));
                    false
                }
                Ok(None) => false,
                Err(e) => {
                    self.pending.push_back(Err(e));
                    true
                }
            },
        }
    }
}

/// Decode an SSE byte stream into text fragments.
///
/// The result ends at `[DONE]`, at end of body, or right after yielding the
/// first error.
pub fn fragments<S, B, E>(body: S) -> BoxStream<'static, Result<String, LlmError>>
where
    S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<LlmError> + Send + 'static,
{
    let state = DecodeState {
        body,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for event in state.decoder.push(chunk.as_ref()) {
                        if state.accept(event) {
                            state.finished = true;
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    state.pending.push_back(Err(e.into()));
                    state.finished = true;
                }
                None => {
                    if let Some(event) = state.decoder.finish() {
                        state.accept(event);
                    }
                    state.finished = true;
                }
            }
        }
    })
    .boxed()
}
