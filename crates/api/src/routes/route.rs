use axum::routing::post;
use axum::Router;

use crate::handlers::route;
use crate::state::AppState;

/// ```text
/// POST /route -> route_request
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/route", post(route::route_request))
}
