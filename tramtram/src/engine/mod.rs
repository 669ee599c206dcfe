//! Live update engine.
//!
//! Owns all per-user state at runtime, fetches arrivals in deduplicated
//! batches, and reconciles each user's messages with what they should see.
//! User commands (`/start`, `/refresh`, stop queries, the STOP button)
//! arrive as trigger methods; the periodic cycle runs in [`Engine::run`].
//!
//! All mutation of a user's state happens under that user's lock, whether
//! driven by the scheduler or by a command, so a trigger and a cycle can
//! never interleave their read-modify-write on the same user.

pub mod dedup;
pub mod render;

mod reconcile;
mod scheduler;


use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Timelike};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::{Config, NightPause};
use crate::domain::{StopId, StopQuery, ViewKey, time};
use crate::provider::{ArrivalProvider, Snapshot, failed_snapshot};
use crate::store::{StateStore, StoreError, UserState};
use crate::transport::{ChatId, MessageId, Transport, TransportError};

/// Sent on `/start` when the user has no trips configured yet.
const WELCOME_TEXT: &str = "👋 *Welcome to TramTram!*\n\n\
    Send me a stop number and I'll show you live arrivals for every line \
    at that stop, updated in place for 15 minutes.\n\n\
    Once your trips are configured, /start shows a live dashboard for each \
    of them.\n\n\
    /refresh rebuilds everything right away.";

/// Runtime knobs for the engine, derived from [`Config`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub night_pause: Option<NightPause>,
    pub stop_ttl_minutes: i64,
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        EngineConfig {
            poll_interval: Duration::from_secs(config.polling_interval_seconds),
            fetch_timeout: Duration::from_secs(config.fetch_timeout_seconds),
            night_pause: config.night_pause,
            stop_ttl_minutes: config.stop_ttl_minutes,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::from(&Config::default())
    }
}

type UserEntry = Arc<Mutex<UserState>>;

/// The engine proper, generic over its three seams: where arrivals come
/// from, where messages go, and where state persists.
pub struct Engine<P, T, S> {
    provider: P,
    transport: T,
    store: S,
    config: EngineConfig,
    users: Mutex<HashMap<ChatId, UserEntry>>,
}

impl<P, T, S> Engine<P, T, S>
where
    P: ArrivalProvider,
    T: Transport,
    S: StateStore,
{
    /// Build an engine, loading every persisted user up front.
    pub fn new(
        provider: P,
        transport: T,
        store: S,
        config: EngineConfig,
    ) -> Result<Self, StoreError> {
        let loaded = store.load_all()?;
        info!(users = loaded.len(), "loaded persisted state");
        let users = loaded
            .into_iter()
            .map(|(chat, state)| (chat, Arc::new(Mutex::new(state))))
            .collect();
        Ok(Engine {
            provider,
            transport,
            store,
            config,
            users: Mutex::new(users),
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }

    /// This user's entry, created empty if unseen.
    async fn user_entry(&self, chat: ChatId) -> UserEntry {
        self.users
            .lock()
            .await
            .entry(chat)
            .or_default()
            .clone()
    }

    pub(crate) async fn user_entries(&self) -> Vec<(ChatId, UserEntry)> {
        self.users
            .lock()
            .await
            .iter()
            .map(|(chat, entry)| (*chat, entry.clone()))
            .collect()
    }

    /// Save one user's state, retrying once. A persistent failure is logged
    /// and surfaced; the in-memory state stays authoritative either way.
    fn persist(&self, chat: ChatId, state: &UserState) -> Result<(), StoreError> {
        if let Err(first) = self.store.save(chat, state) {
            warn!(%chat, error = %first, "state save failed, retrying");
            self.store.save(chat, state).map_err(|e| {
                error!(%chat, error = %e, "state save failed after retry");
                e
            })
        } else {
            Ok(())
        }
    }

    /// Fetch the stops one user needs right now, bounded by the cycle
    /// deadline. On timeout every stop reports as failed.
    async fn fetch_for_user(&self, state: &UserState, now_ts: i64) -> Snapshot {
        let stops = dedup::user_stops(state, now_ts);
        if stops.is_empty() {
            return Snapshot::new();
        }
        self.fetch_bounded(&stops).await
    }

    async fn fetch_bounded(&self, stops: &HashSet<StopId>) -> Snapshot {
        match timeout(self.config.fetch_timeout, self.provider.fetch_stops(stops)).await {
            Ok(snapshot) => snapshot,
            Err(_) => {
                warn!(stops = stops.len(), "arrival fetch deadline exceeded");
                failed_snapshot(stops)
            }
        }
    }

    /// `/start`: tear down every message we know about and rebuild the
    /// dashboard from scratch. This is the user's recovery hammer.
    pub async fn start(&self, chat: ChatId) -> Result<(), StoreError> {
        let entry = self.user_entry(chat).await;
        let mut state = entry.lock().await;

        let mut tracked: Vec<MessageId> = state.messages.drain(..).map(|m| m.id).collect();
        tracked.extend(state.extra_ids.drain(..));
        for id in tracked {
            if let Err(e) = self.transport.delete(chat, id).await {
                debug!(%chat, %id, error = %e, "stale message delete failed");
            }
        }
        state.queries.clear();

        let now = time::rome_now();
        if state.trips.is_empty() {
            match self.transport.create(chat, WELCOME_TEXT, None).await {
                Ok(id) => state.extra_ids.push(id),
                Err(e) => warn!(%chat, error = %e, "welcome message failed"),
            }
        } else {
            let snapshot = self.fetch_for_user(&state, now.timestamp()).await;
            reconcile::run(&self.transport, chat, &mut state, &snapshot, now).await;
        }
        info!(%chat, trips = state.trips.len(), "dashboard rebuilt");
        self.persist(chat, &state)
    }

    /// `/refresh`: one immediate out-of-band cycle for this user alone.
    pub async fn refresh(&self, chat: ChatId) -> Result<(), StoreError> {
        let entry = self.user_entry(chat).await;
        let mut state = entry.lock().await;
        if state.trips.is_empty() && state.queries.is_empty() {
            return Ok(());
        }
        let now = time::rome_now();
        let snapshot = self.fetch_for_user(&state, now.timestamp()).await;
        reconcile::run(&self.transport, chat, &mut state, &snapshot, now).await;
        self.persist(chat, &state)
    }

    /// A numeric message: open a stop query and show it immediately.
    pub async fn open_stop_query(&self, chat: ChatId, stop: StopId) -> Result<(), StoreError> {
        let entry = self.user_entry(chat).await;
        let mut state = entry.lock().await;
        let now = time::rome_now();
        let query = StopQuery::open(stop, now.timestamp(), self.config.stop_ttl_minutes);
        // The same stop number sent twice within a second would produce two
        // queries with the same key, and the reconciler would churn a
        // create+delete on the duplicate every cycle.
        if state.queries.iter().any(|q| q.key() == query.key()) {
            debug!(%chat, stop = %query.stop, "duplicate stop query ignored");
        } else {
            info!(%chat, stop = %query.stop, "stop query opened");
            state.queries.push(query);
        }
        let snapshot = self.fetch_for_user(&state, now.timestamp()).await;
        reconcile::run(&self.transport, chat, &mut state, &snapshot, now).await;
        self.persist(chat, &state)
    }

    /// STOP button: remove the query and its message immediately. A second
    /// press, or a press after expiry, is a no-op.
    pub async fn dismiss_query(
        &self,
        chat: ChatId,
        stop: StopId,
        created_at: i64,
    ) -> Result<(), StoreError> {
        let entry = self.user_entry(chat).await;
        let mut state = entry.lock().await;
        let key = ViewKey::StopQuery { stop, created_at };

        let known = state.queries.iter().any(|q| q.key() == key)
            || state.messages.iter().any(|m| m.view == key);
        if !known {
            return Ok(());
        }

        state.queries.retain(|q| q.key() != key);
        let mut removed = Vec::new();
        state.messages.retain(|m| {
            if m.view == key {
                removed.push(m.id);
                false
            } else {
                true
            }
        });
        for id in removed {
            if let Err(e) = self.transport.delete(chat, id).await {
                debug!(%chat, %id, error = %e, "query message delete failed");
            }
        }
        info!(%chat, "stop query dismissed");
        self.persist(chat, &state)
    }

    /// Delete the user's own incoming message to keep the chat clean. If it
    /// cannot be deleted now, remember the id for the next `/start` sweep.
    pub async fn consume_incoming(&self, chat: ChatId, id: MessageId) {
        match self.transport.delete(chat, id).await {
            Ok(()) | Err(TransportError::NotFound) => {}
            Err(e) => {
                debug!(%chat, %id, error = %e, "incoming message delete failed");
                let entry = self.user_entry(chat).await;
                let mut state = entry.lock().await;
                state.extra_ids.push(id);
                let _ = self.persist(chat, &state);
            }
        }
    }

    /// True during the configured night window (Europe/Rome hours).
    pub fn is_paused(&self, hour: u32) -> bool {
        self.config
            .night_pause
            .as_ref()
            .is_some_and(|pause| pause.contains(hour))
    }

    /// One scheduler slot: skip entirely during the night pause, otherwise
    /// run a full cycle.
    pub async fn cycle(&self, now: DateTime<FixedOffset>) {
        if self.is_paused(now.hour()) {
            debug!(hour = now.hour(), "night pause, skipping cycle");
            return;
        }
        self.tick(now).await;
    }
}
