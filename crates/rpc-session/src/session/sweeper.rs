//! Background expiry task.
//!
//! Periodically evicts sessions idle for longer than the configured timeout.

use std::sync::Weak;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use super::store::SessionStore;

/// Spawn a task that sweeps `store` every `every`.
///
/// The task holds only a weak reference and exits once the store is dropped.
pub fn spawn_sweeper(store: Weak<SessionStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(store) = store.upgrade() else {
                debug!("Session store dropped, sweeper exiting");
                break;
            };

            let evicted = store.sweep();
            if evicted > 0 {
                info!(evicted, remaining = store.len(), "Session sweep completed");
            } else {
                debug!(active_sessions = store.len(), "Session sweep: nothing to evict");
            }
        }
    })
}
