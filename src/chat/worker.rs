//! Background completion worker
//!
//! Spawned per accepted utterance and never joined; the request handler
//! only ever observes the response slot this task writes. All backend
//! failures are absorbed here and surfaced as `ResponseSlot::Error` -
//! the request path must never see them as errors.

use crate::chat::client::CompletionBackend;
use crate::conversation::{ChatMessage, ConversationStore, ResponseSlot};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// In-flight completion guard, keyed by user id. Present while a worker
/// for the user is running; acts as the compare-and-set that keeps
/// concurrent requests from launching duplicate completions.
pub type InflightGuard = Arc<DashMap<String, ()>>;

/// A claimed in-flight entry that releases itself on drop.
///
/// The handler awaits store operations between claiming the entry and
/// spawning the worker, and axum drops the handler future when the
/// client disconnects. Removal on drop keeps a cancelled handler from
/// leaving a permanent entry that would deny every later launch for the
/// user. Once the worker is spawned, call [`InflightClaim::transfer`]:
/// the worker then owns removal.
pub struct InflightClaim {
    inflight: InflightGuard,
    user_id: String,
    transferred: bool,
}

impl InflightClaim {
    /// Claim the entry for `user_id`; `None` if one is already held
    pub fn try_claim(inflight: &InflightGuard, user_id: &str) -> Option<Self> {
        if inflight.insert(user_id.to_string(), ()).is_some() {
            return None;
        }
        Some(Self {
            inflight: inflight.clone(),
            user_id: user_id.to_string(),
            transferred: false,
        })
    }

    /// Hand removal responsibility to the spawned worker
    pub fn transfer(mut self) {
        self.transferred = true;
    }
}

impl Drop for InflightClaim {
    fn drop(&mut self) {
        if !self.transferred {
            self.inflight.remove(&self.user_id);
        }
    }
}

/// Run one completion for `user_id` and publish the outcome.
///
/// On success the reply lands in the response slot and, if a history
/// still exists for the user, as an appended assistant turn. On any
/// failure the slot gets the error sentinel. The in-flight guard entry
/// is removed last, after the slot write is visible.
pub async fn run_completion(
    store: ConversationStore,
    backend: Arc<dyn CompletionBackend>,
    inflight: InflightGuard,
    messages: Vec<ChatMessage>,
    user_id: String,
) {
    match backend.complete(&messages).await {
        Ok(reply) => {
            debug!(user_id = %user_id, "completion finished");
            store
                .set_response_slot(&user_id, ResponseSlot::Reply(reply.clone()))
                .await;

            // The history may have expired or been reset while we waited
            if let Some(mut history) = store.history(&user_id).await {
                history.push(ChatMessage::assistant(reply));
                store.set_history(&user_id, history).await;
            }
        }
        Err(e) => {
            error!(user_id = %user_id, "completion failed: {e}");
            store.set_response_slot(&user_id, ResponseSlot::Error).await;
        }
    }

    inflight.remove(&user_id);
}
