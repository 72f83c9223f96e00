//! Periodic full-cache eviction sweep

use crate::chat::InflightGuard;
use crate::conversation::ConversationStore;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Spawn the background task that unconditionally clears the store on a
/// fixed period. Coarse memory bound, independent of request handling.
/// The in-flight guard is cleared along with the store: once the
/// conversation state is gone, any remaining entry could only deny
/// future launches. The caller aborts the returned handle at shutdown.
pub fn spawn_cache_sweep(
    store: ConversationStore,
    inflight: InflightGuard,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // First tick fires immediately; skip it so the sweep starts one
        // full period after startup
        ticker.tick().await;
        loop {
            ticker.tick().await;
            info!("cache sweep: clearing conversation store");
            store.clear();
            inflight.clear();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationStore, ResponseSlot};
    use dashmap::DashMap;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_clears_store_and_inflight_each_period() {
        let store = ConversationStore::new(Duration::from_secs(3600), "persona");
        store.set_response_slot("u1", ResponseSlot::Init).await;
        let inflight: InflightGuard = Arc::new(DashMap::new());
        inflight.insert("u1".to_string(), ());

        let handle = spawn_cache_sweep(store.clone(), inflight.clone(), Duration::from_secs(60));

        // Just before the first period everything is still there
        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(store.response_slot("u1").await.is_some());
        assert!(inflight.contains_key("u1"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        // Let the sweep task run and the invalidation settle
        tokio::task::yield_now().await;
        assert!(store.response_slot("u1").await.is_none());
        assert!(!inflight.contains_key("u1"));

        handle.abort();
    }
}
