use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frontdoor_api::config::ServerConfig;
use frontdoor_api::router::build_app_router;
use frontdoor_api::seed::import_seed_file;
use frontdoor_api::state::AppState;
use frontdoor_db::RuleStore;
use frontdoor_llm::{ChatCompletion, CompletionClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "frontdoor_api=debug,frontdoor_db=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let pool = frontdoor_db::create_pool(&config.database_url)
        .await
        .expect("Failed to open rule database");
    tracing::info!(database_url = %config.database_url, "Database connection pool created");

    frontdoor_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    frontdoor_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Rule store ---
    let store = Arc::new(RuleStore::new(pool));

    // Every stored row must decode; a corrupt store is fatal.
    let rule_count = store
        .list()
        .await
        .expect("Failed to load stored rules")
        .len();
    tracing::info!(rule_count, "Rule store ready");

    if let Some(path) = &config.rules_seed_path {
        import_seed_file(&store, path)
            .await
            .expect("Failed to import seed rules");
    }

    // --- Completion service ---
    let llm = CompletionClient::from_config(&config.llm)
        .expect("Failed to build completion client")
        .map(|client| {
            tracing::info!(model = %client.model(), "Completion service configured");
            Arc::new(client) as Arc<dyn ChatCompletion>
        });
    if llm.is_none() {
        tracing::warn!("OPENAI_API_KEY not set, chat is disabled");
    }

    // --- App state ---
    let shutdown = CancellationToken::new();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        llm,
        shutdown: shutdown.clone(),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Open chat streams would otherwise hold their connections.
            shutdown.cancel();
        })
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
