//! Conversation store backed by an expiring in-memory cache
//!
//! All per-user state (the user record, the message history, and the
//! response slot) lives in one key space with a shared TTL. Every write
//! refreshes the entry's TTL; expiry is cleanup, not a protocol
//! mechanism. Reads and writes copy whole values, so callers update a
//! container and write it back rather than mutating in place.

use crate::conversation::models::{ChatMessage, ResponseSlot, UserRecord};
use moka::future::Cache;
use std::time::Duration;

/// Value stored under a single key
#[derive(Debug, Clone)]
enum StoreValue {
    User(UserRecord),
    Messages(Vec<ChatMessage>),
    Slot(ResponseSlot),
}

/// Process-wide conversation store. Cheap to clone; constructed once at
/// startup and handed to the handlers and background tasks.
#[derive(Clone)]
pub struct ConversationStore {
    cache: Cache<String, StoreValue>,
    system_prompt: String,
}

impl ConversationStore {
    pub fn new(ttl: Duration, system_prompt: impl Into<String>) -> Self {
        let cache = Cache::builder().time_to_live(ttl).build();
        Self { cache, system_prompt: system_prompt.into() }
    }

    fn messages_key(user_id: &str) -> String {
        format!("{user_id}-messages")
    }

    fn response_key(user_id: &str) -> String {
        format!("{user_id}-response")
    }

    pub async fn user(&self, user_id: &str) -> Option<UserRecord> {
        match self.cache.get(user_id).await {
            Some(StoreValue::User(record)) => Some(record),
            _ => None,
        }
    }

    pub async fn set_user(&self, record: UserRecord) {
        self.cache
            .insert(record.user_id.clone(), StoreValue::User(record))
            .await;
    }

    pub async fn history(&self, user_id: &str) -> Option<Vec<ChatMessage>> {
        match self.cache.get(&Self::messages_key(user_id)).await {
            Some(StoreValue::Messages(messages)) => Some(messages),
            _ => None,
        }
    }

    pub async fn set_history(&self, user_id: &str, messages: Vec<ChatMessage>) {
        self.cache
            .insert(Self::messages_key(user_id), StoreValue::Messages(messages))
            .await;
    }

    /// Reset the history to exactly one system message (the persona prompt)
    pub async fn reset_history(&self, user_id: &str) {
        let messages = vec![ChatMessage::system(self.system_prompt.clone())];
        self.set_history(user_id, messages).await;
    }

    pub async fn response_slot(&self, user_id: &str) -> Option<ResponseSlot> {
        match self.cache.get(&Self::response_key(user_id)).await {
            Some(StoreValue::Slot(slot)) => Some(slot),
            _ => None,
        }
    }

    pub async fn set_response_slot(&self, user_id: &str, slot: ResponseSlot) {
        self.cache
            .insert(Self::response_key(user_id), StoreValue::Slot(slot))
            .await;
    }

    /// Drop every entry for every user
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
