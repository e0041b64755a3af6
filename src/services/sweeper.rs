//! Periodic idle-session eviction.

use std::time::Instant;

use tokio::time::interval;
use tracing::{debug, info};

use crate::state::SharedState;

/// Run the idle sweep forever at the configured interval.
///
/// The sweep runs on its own timer against a coarser threshold to bound
/// memory growth from abandoned sessions; per-identity exclusivity is
/// handled inside the store.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().sweep_interval);

    loop {
        ticker.tick().await;
        let threshold = state.config().idle_threshold;
        let evicted = state.sessions().sweep_idle(Instant::now(), threshold);
        if evicted.is_empty() {
            debug!(active = state.sessions().len(), "idle sweep found nothing to evict");
        } else {
            info!(
                count = evicted.len(),
                active = state.sessions().len(),
                "evicted idle sessions"
            );
        }
    }
}
