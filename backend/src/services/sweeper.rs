use std::sync::Arc;
use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::services::token_store::TokenStore;

/// Periodically reclaims expired tokens. Expiry is still enforced on every
/// consume, so a late or skipped sweep only costs memory.
pub fn spawn_token_sweeper(store: Arc<TokenStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.sweep_expired();
            if removed > 0 {
                tracing::debug!(removed, remaining = store.len(), "Swept expired tokens");
            }
        }
    })
}
