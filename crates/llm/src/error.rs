/// Errors from the chat completion layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The HTTP request itself failed (network, DNS, TLS, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-2xx status code.
    #[error("Completion API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The API reported an error inside an already-open event stream.
    #[error("Completion stream error: {0}")]
    Upstream(String),

    /// A stream chunk was not valid JSON.
    #[error("Malformed stream chunk: {0}")]
    Decode(#[from] serde_json::Error),
}
