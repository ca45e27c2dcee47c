//! Background tasks for the parley server.
//!
//! Includes:
//! - Pruning idle conversation sessions.

use parley_session::SessionStore;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Starts the session pruning task.
///
/// Runs indefinitely, dropping sessions idle for longer than the store's TTL
/// every `interval_seconds`. Returns immediately when `ttl_seconds` is 0.
pub async fn start_session_pruning_task(
    store: SessionStore,
    interval_seconds: u64,
    ttl_seconds: u64,
) {
    if ttl_seconds == 0 {
        tracing::warn!("session pruning task disabled (idle_ttl_seconds=0)");
        return;
    }

    let interval_seconds = interval_seconds.max(1);
    tracing::info!(
        ttl_seconds,
        interval_seconds,
        "starting session pruning task"
    );

    let mut ticker = interval(Duration::from_secs(interval_seconds));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let pruned = store.prune_expired();
        if !pruned.is_empty() {
            tracing::info!(
                count = pruned.len(),
                remaining = store.len(),
                "pruned idle sessions"
            );
            for session_id in pruned {
                tracing::debug!(session_id, "session expired");
            }
        }
    }
}
