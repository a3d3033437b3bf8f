//! Chat message types and sanitising for the chat-turn endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Roles accepted from callers and forwarded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "system" => Some(ChatRole::System),
            "user" => Some(ChatRole::User),
            "assistant" => Some(ChatRole::Assistant),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Keep well-formed `{role, content}` entries from a raw `messages` value.
///
/// Anything that is not an array yields an empty list. Entries that are not
/// objects, lack a string `role` or `content`, or use another role are
/// dropped silently.
pub fn sanitize_messages(raw: &Value) -> Vec<ChatMessage> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let role = entry.get("role")?.as_str()?;
            let content = entry.get("content")?.as_str()?;
            Some(ChatMessage::new(ChatRole::parse(role)?, content))
        })
        .collect()
}

/// Prepend the routing instruction to the caller's conversation.
pub fn with_system_prompt(system_prompt: String, messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(ChatMessage::new(ChatRole::System, system_prompt));
    out.extend(messages);
    out
}
