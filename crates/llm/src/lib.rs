//! Streaming client for OpenAI-compatible chat completion APIs.
//!
//! The API crate talks to the model through the [`ChatCompletion`] trait so
//! that tests can substitute a scripted implementation for the HTTP client.

pub mod client;
pub mod config;
pub mod error;
pub mod sse;

use async_trait::async_trait;
use frontdoor_core::chat::ChatMessage;
use futures::stream::BoxStream;

pub use client::CompletionClient;
pub use config::LlmConfig;
pub use error::LlmError;

/// Text fragments in arrival order. Ends after the last fragment or after
/// the first error.
pub type FragmentStream = BoxStream<'static, Result<String, LlmError>>;

/// A chat model that answers a conversation with a stream of text.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Start a completion for `messages`.
    ///
    /// An `Err` means nothing was produced. Dropping the returned stream
    /// aborts the underlying request.
    async fn stream_chat(&self, messages: Vec<ChatMessage>) -> Result<FragmentStream, LlmError>;
}
