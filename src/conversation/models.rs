//! Data models for per-user conversation state

use serde::{Deserialize, Serialize};

/// Message author role, serialized the way the completion API expects it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Per-user record created on first contact.
///
/// `chat_limit` is recorded but not enforced anywhere yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: String,
    pub chat_limit: u32,
}

/// The single mutable cell a background completion and the request
/// handler communicate through. `Reply` carries the model's answer;
/// the other variants are control states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSlot {
    /// No question has been asked yet
    Init,
    /// A completion is in flight
    Running,
    /// The completion failed; details were logged by the worker
    Error,
    /// The model's reply text
    Reply(String),
}

impl ResponseSlot {
    pub fn is_running(&self) -> bool {
        matches!(self, ResponseSlot::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hello");
    }

    #[test]
    fn test_role_as_str() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_slot_is_running() {
        assert!(ResponseSlot::Running.is_running());
        assert!(!ResponseSlot::Init.is_running());
        assert!(!ResponseSlot::Reply("hi".to_string()).is_running());
    }
}
