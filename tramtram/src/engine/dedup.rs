//! Stop-id deduplication.
//!
//! A cycle fetches each distinct stop id exactly once, no matter how many
//! trips, users, or open stop queries reference it.

use std::collections::HashSet;

use crate::domain::StopId;
use crate::store::UserState;

/// The stops one user needs this cycle: boarding stops of every configured
/// trip plus the targets of unexpired stop queries. Alighting stops are
/// display-only and never fetched.
pub fn user_stops(state: &UserState, now_ts: i64) -> HashSet<StopId> {
    let mut stops: HashSet<StopId> = state
        .trips
        .iter()
        .flat_map(|trip| trip.boarding_stops().cloned())
        .collect();
    stops.extend(
        state
            .queries
            .iter()
            .filter(|q| !q.is_expired(now_ts))
            .map(|q| q.stop.clone()),
    );
    stops
}

/// The union of every user's needed stops.
pub fn required_stops<'a, I>(states: I, now_ts: i64) -> HashSet<StopId>
where
    I: IntoIterator<Item = &'a UserState>,
{
    let mut stops = HashSet::new();
    for state in states {
        stops.extend(user_stops(state, now_ts));
    }
    stops
}
