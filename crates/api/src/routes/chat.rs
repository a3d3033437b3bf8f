use axum::routing::post;
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// ```text
/// POST /chat -> chat_turn
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat::chat_turn))
}
