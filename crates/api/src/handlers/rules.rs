//! Handlers for routing-rule CRUD.
//!
//! Create and update payloads are pruned of blank condition values and then
//! validated before they reach the store. Delete optionally requires the
//! caller to retype the rule name.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use frontdoor_core::error::CoreError;
use frontdoor_core::rules::{RuleInput, RulePatch};
use frontdoor_core::types::RuleId;
use frontdoor_core::validation::{
    validate_rule_input, validate_rule_patch, DELETE_CONFIRMATION_MISMATCH,
};
use frontdoor_db::DeleteOutcome;
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters for `DELETE /api/rules/{id}`.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// Retyped rule name. When present it must match before anything is deleted.
    pub confirm: Option<String>,
}

fn rule_not_found(id: RuleId) -> CoreError {
    CoreError::NotFound { entity: "Rule", id }
}

/// GET /api/rules
///
/// Every rule, active and inactive, in store order.
pub async fn list_rules(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let rules = state.store.list().await?;
    Ok(Json(rules))
}

/// GET /api/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<RuleId>,
) -> AppResult<impl IntoResponse> {
    let rule = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| rule_not_found(id))?;
    Ok(Json(rule))
}

/// POST /api/rules
///
/// Returns 201 with the stored rule, including its generated id and timestamps.
pub async fn create_rule(
    State(state): State<AppState>,
    input: Result<Json<RuleInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let input = input.pruned();
    validate_rule_input(&input)?;

    let rule = state.store.create(input).await?;

    tracing::info!(rule_id = %rule.id, name = %rule.name, "Rule created");

    Ok((StatusCode::CREATED, Json(rule)))
}

/// PUT /api/rules/{id}
///
/// Partial update. Fields absent from the body keep their stored values;
/// `id` and `createdAt` in the body are ignored.
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<RuleId>,
    patch: Result<Json<RulePatch>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(patch) = patch?;
    let patch = patch.pruned();
    validate_rule_patch(&patch)?;

    let rule = state
        .store
        .update(&id, patch)
        .await?
        .ok_or_else(|| rule_not_found(id))?;

    tracing::info!(rule_id = %rule.id, active = rule.active, "Rule updated");

    Ok(Json(rule))
}

/// DELETE /api/rules/{id}?confirm=<name>
///
/// Returns 204 on success. A supplied `confirm` that does not match the
/// rule's name blocks the delete with 400.
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<RuleId>,
    Query(params): Query<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    let removed = match params.confirm.as_deref() {
        Some(confirmation) => match state.store.delete_if_named(&id, confirmation).await? {
            DeleteOutcome::Deleted => true,
            DeleteOutcome::NotFound => false,
            DeleteOutcome::NameMismatch => {
                return Err(
                    CoreError::Validation(DELETE_CONFIRMATION_MISMATCH.to_string()).into(),
                );
            }
        },
        None => state.store.delete(&id).await?,
    };

    if !removed {
        return Err(rule_not_found(id).into());
    }

    tracing::info!(rule_id = %id, "Rule deleted");

    Ok(StatusCode::NO_CONTENT)
}
