use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frontdoor_core::error::CoreError;
use frontdoor_db::StoreError;
use frontdoor_llm::LlmError;
use serde_json::json;

/// Message returned when chat is requested without upstream credentials.
pub const UPSTREAM_NOT_CONFIGURED_MESSAGE: &str = "Server missing OpenAI credentials";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `frontdoor_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A persistence failure from the rule store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The completion service failed before any text was streamed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] LlmError),

    /// Chat was requested but no API key is configured.
    #[error("Completion service is not configured")]
    UpstreamNotConfigured,

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Store errors ---
            AppError::Store(StoreError::Database(err)) => {
                tracing::error!(error = %err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }

            // --- Completion service errors ---
            AppError::Upstream(err) => {
                tracing::error!(error = %err, "Completion request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_UNAVAILABLE",
                    "Failed to stream response".to_string(),
                )
            }
            AppError::UpstreamNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_NOT_CONFIGURED",
                UPSTREAM_NOT_CONFIGURED_MESSAGE.to_string(),
            ),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
