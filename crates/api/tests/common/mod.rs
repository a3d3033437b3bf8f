#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use frontdoor_api::config::ServerConfig;
use frontdoor_api::router::build_app_router;
use frontdoor_api::state::AppState;
use frontdoor_core::chat::ChatMessage;
use frontdoor_core::rules::Assignee;
use frontdoor_db::RuleStore;
use frontdoor_llm::{ChatCompletion, FragmentStream, LlmConfig, LlmError};
use futures::stream::{self, StreamExt};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        rules_seed_path: None,
        fallback_contact: Assignee {
            name: "Legal Front Door".to_string(),
            email: "legal@acme.corp".to_string(),
        },
        llm: LlmConfig::default(),
    }
}

/// A fresh store backed by a private in-memory database.
pub async fn test_store() -> Arc<RuleStore> {
    let pool = frontdoor_db::create_memory_pool()
        .await
        .expect("in-memory pool");
    Arc::new(RuleStore::new(pool))
}

/// Build the full application router without a completion service.
pub fn build_test_app(store: Arc<RuleStore>) -> Router {
    build_app(store, None)
}

/// Build the full application router with the given completion service.
pub fn build_chat_app(store: Arc<RuleStore>, llm: Arc<dyn ChatCompletion>) -> Router {
    build_app(store, Some(llm))
}

fn build_app(store: Arc<RuleStore>, llm: Option<Arc<dyn ChatCompletion>>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        llm,
        shutdown: CancellationToken::new(),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A valid create payload routing Australian contract requests to Jane.
pub fn sales_au_rule() -> serde_json::Value {
    serde_json::json!({
        "name": "Sales AU",
        "active": true,
        "conditions": [
            { "field": "location", "operator": "equals", "value": "Australia" },
            { "field": "requestType", "operator": "equals", "value": "contract" }
        ],
        "assignee": { "name": "Jane", "email": "jane@acme.corp" }
    })
}

// ---------------------------------------------------------------------------
// Fake completion services
// ---------------------------------------------------------------------------

/// One scripted stream item.
pub enum Step {
    Text(&'static str),
    Fail,
}

/// Replays a fixed script and records every conversation it was sent.
pub struct ScriptedCompletion {
    steps: Vec<Step>,
    refuse: bool,
    pub conversations: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletion {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            refuse: false,
            conversations: Mutex::new(Vec::new()),
        }
    }

    /// Fails before producing anything, like an unreachable upstream.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl ChatCompletion for ScriptedCompletion {
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream, LlmError> {
        self.conversations.lock().unwrap().push(messages);

        if self.refuse {
            return Err(LlmError::ApiError {
                status: 503,
                body: "upstream down".to_string(),
            });
        }

        let items: Vec<Result<String, LlmError>> = self
            .steps
            .iter()
            .map(|step| match step {
                Step::Text(text) => Ok(text.to_string()),
                Step::Fail => Err(LlmError::Upstream("connection reset".to_string())),
            })
            .collect();
        Ok(stream::iter(items).boxed())
    }
}

/// Sends one fragment and then never finishes. `aborted` is cancelled when
/// the stream is dropped.
pub struct HangingCompletion {
    pub aborted: CancellationToken,
}

impl HangingCompletion {
    pub fn new() -> Self {
        Self {
            aborted: CancellationToken::new(),
        }
    }
}

#[async_trait]
impl ChatCompletion for HangingCompletion {
    async fn stream_chat(&self, _messages: Vec<ChatMessage>) -> Result<FragmentStream, LlmError> {
        let guard = self.aborted.clone().drop_guard();
        let stream = stream::once(async { Ok("hello".to_string()) })
            .chain(stream::pending())
            .map(move |item| {
                let _keep = &guard;
                item
            });
        Ok(stream.boxed())
    }
}
