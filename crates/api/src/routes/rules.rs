//! Route definitions for routing-rule CRUD.

use axum::routing::get;
use axum::Router;

use crate::handlers::rules;
use crate::state::AppState;

/// Rule routes mounted at `/rules`.
///
/// ```text
/// GET    /      -> list_rules
/// POST   /      -> create_rule
/// GET    /{id}  -> get_rule
/// PUT    /{id}  -> update_rule
/// DELETE /{id}  -> delete_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rules::list_rules).post(rules::create_rule))
        .route(
            "/{id}",
            get(rules::get_rule)
                .put(rules::update_rule)
                .delete(rules::delete_rule),
        )
}
