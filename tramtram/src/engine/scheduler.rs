//! Periodic update cycle.
//!
//! Cycles are strictly serialized: the next slot is awaited only after the
//! previous cycle finishes, and a slot that would have fired mid-cycle is
//! delayed rather than burst. One cycle does one batched fetch for the
//! union of every user's stops, then reconciles users concurrently.

use chrono::{DateTime, FixedOffset};
use futures::future::join_all;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::provider::ArrivalProvider;
use crate::store::StateStore;
use crate::transport::Transport;

use super::{Engine, dedup, reconcile};
use crate::domain::time;

impl<P, T, S> Engine<P, T, S>
where
    P: ArrivalProvider,
    T: Transport,
    S: StateStore,
{
    /// Run the scheduler forever.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.cycle(time::rome_now()).await;
        }
    }

    /// One update cycle: collect the stops every user needs, fetch each
    /// distinct stop once, then reconcile every affected user against the
    /// shared snapshot.
    pub(crate) async fn tick(&self, now: DateTime<FixedOffset>) {
        let now_ts = now.timestamp();
        let users = self.user_entries().await;

        let mut required = std::collections::HashSet::new();
        let mut active = Vec::new();
        for (chat, entry) in users {
            let state = entry.lock().await;
            let stops = dedup::user_stops(&state, now_ts);
            // A user whose last query just expired has nothing to fetch but
            // still needs a pass to remove the expired card.
            let has_expired = state.queries.iter().any(|q| q.is_expired(now_ts));
            drop(state);
            if !stops.is_empty() || has_expired {
                required.extend(stops);
                active.push((chat, entry));
            }
        }
        if active.is_empty() {
            return;
        }
        debug!(stops = required.len(), users = active.len(), "cycle fetch");
        let snapshot = if required.is_empty() {
            crate::provider::Snapshot::new()
        } else {
            self.fetch_bounded(&required).await
        };

        let tasks = active.into_iter().map(|(chat, entry)| {
            let snapshot = &snapshot;
            async move {
                let mut state = entry.lock().await;
                let before = state.clone();
                reconcile::run(&self.transport, chat, &mut state, snapshot, now).await;
                if *state != before {
                    let _ = self.persist(chat, &state);
                }
            }
        });
        join_all(tasks).await;
    }
}
