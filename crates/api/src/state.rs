use std::sync::Arc;

use frontdoor_db::RuleStore;
use frontdoor_llm::ChatCompletion;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind an `Arc` or is a handle.
#[derive(Clone)]
pub struct AppState {
    /// The single rule store.
    pub store: Arc<RuleStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Completion service. `None` when no API key is configured.
    pub llm: Option<Arc<dyn ChatCompletion>>,
    /// Cancelled when the server begins shutting down; ends open chat streams.
    pub shutdown: CancellationToken,
}
