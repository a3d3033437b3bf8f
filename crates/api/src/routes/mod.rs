pub mod chat;
pub mod health;
pub mod route;
pub mod rules;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rules                 list, create
/// /rules/{id}            get, update, delete (?confirm=<name>)
/// /route                 match a normalized request (POST)
/// /chat                  streamed routing conversation (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rules", rules::router())
        .merge(route::router())
        .merge(chat::router())
}
