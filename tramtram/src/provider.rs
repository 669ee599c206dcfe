//! Arrival data provider contract.
//!
//! The engine fetches every distinct stop it needs in one logical batch per
//! cycle. Failures are scoped per stop: a transient failure or an unknown
//! stop identifier degrades that stop's views, never the whole cycle.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use crate::domain::StopId;

/// One upcoming departure of a line at a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Bare line identifier (e.g. `"42"`).
    pub line: String,
    /// Destination text reported for this departure.
    pub headsign: String,
    /// Whole minutes until arrival.
    pub minutes: i64,
    /// True when the offset comes from realtime data rather than the timetable.
    pub realtime: bool,
}

/// Fetched arrival data for one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopBoard {
    /// Human-readable stop name, when the provider resolves one.
    pub name: Option<String>,
    /// Upcoming departures across all lines, ascending by minutes.
    pub departures: Vec<Departure>,
}

/// Per-stop fetch outcome.
///
/// `Unknown` and `Failed` are rendered as distinct placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopFetch {
    Board(StopBoard),
    /// The provider reports the stop identifier does not exist.
    Unknown,
    /// Transient failure (timeout, network, provider error).
    Failed,
}

/// Result of one cycle's batched fetch, keyed by stop.
pub type Snapshot = HashMap<StopId, StopFetch>;

/// Upstream arrival data source.
pub trait ArrivalProvider: Send + Sync {
    /// Fetch boards for every stop in the set.
    ///
    /// Implementations may fan out into bounded-parallel sub-requests, but
    /// per-stop failures stay inside the snapshot; the call itself does not
    /// fail.
    fn fetch_stops(&self, stops: &HashSet<StopId>) -> impl Future<Output = Snapshot> + Send;
}

/// Snapshot marking every requested stop as transiently failed.
///
/// Used when the whole provider call misses its deadline.
pub fn failed_snapshot(stops: &HashSet<StopId>) -> Snapshot {
    stops
        .iter()
        .map(|s| (s.clone(), StopFetch::Failed))
        .collect()
}

/// In-memory provider serving canned boards.
///
/// Records each request set, so tests can assert deduplication.
#[derive(Debug, Default)]
pub struct MockProvider {
    boards: Mutex<Snapshot>,
    calls: Mutex<Vec<HashSet<StopId>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canned outcome for a stop. Unset stops fetch as `Failed`.
    pub fn insert(&self, stop: StopId, fetch: StopFetch) {
        self.boards.lock().unwrap().insert(stop, fetch);
    }

    /// Every request set seen so far, in call order.
    pub fn calls(&self) -> Vec<HashSet<StopId>> {
        self.calls.lock().unwrap().clone()
    }
}

impl ArrivalProvider for MockProvider {
    async fn fetch_stops(&self, stops: &HashSet<StopId>) -> Snapshot {
        self.calls.lock().unwrap().push(stops.clone());
        let boards = self.boards.lock().unwrap();
        stops
            .iter()
            .map(|s| {
                let fetch = boards.get(s).cloned().unwrap_or(StopFetch::Failed);
                (s.clone(), fetch)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(s: &str) -> StopId {
        StopId::new(s).unwrap()
    }

    #[tokio::test]
    async fn mock_records_request_sets() {
        let provider = MockProvider::new();
        provider.insert(
            stop("1132"),
            StopFetch::Board(StopBoard {
                name: Some("Adriano".to_string()),
                departures: vec![],
            }),
        );

        let request: HashSet<StopId> = [stop("1132"), stop("40")].into_iter().collect();
        let snapshot = provider.fetch_stops(&request).await;

        assert_eq!(snapshot.len(), 2);
        assert!(matches!(snapshot[&stop("1132")], StopFetch::Board(_)));
        assert_eq!(snapshot[&stop("40")], StopFetch::Failed);
        assert_eq!(provider.calls(), vec![request]);
    }

    #[test]
    fn failed_snapshot_covers_every_stop() {
        let stops: HashSet<StopId> = [stop("1"), stop("2"), stop("3")].into_iter().collect();
        let snapshot = failed_snapshot(&stops);
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.values().all(|f| *f == StopFetch::Failed));
    }
}
