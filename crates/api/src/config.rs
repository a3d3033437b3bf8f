use std::path::PathBuf;

use frontdoor_core::rules::Assignee;
use frontdoor_llm::LlmConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Time allowed until response headers are sent, in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://data/rules.db`).
    pub database_url: String,
    /// Legacy `rules.json` imported into an empty store at startup.
    pub rules_seed_path: Option<PathBuf>,
    /// Contact named when no rule matches.
    pub fallback_contact: Assignee,
    /// Completion service settings.
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `5000`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `DATABASE_URL`           | `sqlite://data/rules.db` |
    /// | `RULES_SEED_PATH`        | unset                    |
    /// | `FALLBACK_CONTACT_NAME`  | `Legal Front Door`       |
    /// | `FALLBACK_CONTACT_EMAIL` | `legal@acme.corp`        |
    ///
    /// Completion settings come from [`LlmConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/rules.db".into());

        let rules_seed_path = std::env::var("RULES_SEED_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let fallback_contact = Assignee {
            name: std::env::var("FALLBACK_CONTACT_NAME")
                .unwrap_or_else(|_| "Legal Front Door".into()),
            email: std::env::var("FALLBACK_CONTACT_EMAIL")
                .unwrap_or_else(|_| "legal@acme.corp".into()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            rules_seed_path,
            fallback_contact,
            llm: LlmConfig::from_env(),
        }
    }
}
