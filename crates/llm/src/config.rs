//! Completion client configuration loaded from environment variables.

use secrecy::SecretString;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
const DEFAULT_REASONING_EFFORT: &str = "low";

/// Settings for [`crate::CompletionClient`].
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer token. `None` disables chat.
    pub api_key: Option<SecretString>,
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    /// Sent as `reasoning_effort` when set.
    pub reasoning_effort: Option<String>,
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("reasoning_effort", &self.reasoning_effort)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            reasoning_effort: Some(DEFAULT_REASONING_EFFORT.to_string()),
            connect_timeout_secs: 10,
        }
    }
}

impl LlmConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// | Env var                    | Default                     |
    /// |----------------------------|-----------------------------|
    /// | `OPENAI_API_KEY`           | unset                       |
    /// | `OPENAI_BASE_URL`          | `https://api.openai.com/v1` |
    /// | `LLM_MODEL`                | `openai/gpt-oss-120b`       |
    /// | `LLM_REASONING_EFFORT`     | `low` (empty disables)      |
    /// | `LLM_CONNECT_TIMEOUT_SECS` | `10`                        |
    ///
    /// An empty `OPENAI_API_KEY` counts as unset.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::from);

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let reasoning_effort = match std::env::var("LLM_REASONING_EFFORT") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value),
            Err(_) => Some(DEFAULT_REASONING_EFFORT.to_string()),
        };

        let connect_timeout_secs: u64 = std::env::var("LLM_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("LLM_CONNECT_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            model,
            reasoning_effort,
            connect_timeout_secs,
        }
    }
}
