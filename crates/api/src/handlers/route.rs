//! Server-side evaluation of the routing rules.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use frontdoor_core::matcher::{match_rule, NormalizedRequest};
use frontdoor_core::rules::{Assignee, Rule};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Outcome of routing one request.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Whether a rule matched. `false` means the fallback contact applies.
    pub matched: bool,
    /// The first matching active rule.
    pub rule: Option<Rule>,
    /// The matched rule's assignee, or the fallback contact.
    pub assignee: Assignee,
}

/// POST /api/route
pub async fn route_request(
    State(state): State<AppState>,
    request: Result<Json<NormalizedRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = request?;
    let rules = state.store.list().await?;

    let response = match match_rule(&request, &rules) {
        Some(rule) => RouteResponse {
            matched: true,
            assignee: rule.assignee.clone(),
            rule: Some(rule.clone()),
        },
        None => RouteResponse {
            matched: false,
            rule: None,
            assignee: state.config.fallback_contact.clone(),
        },
    };

    tracing::debug!(
        matched = response.matched,
        assignee = %response.assignee.email,
        "Request routed",
    );

    Ok(Json(response))
}
