//! Ephemeral stop queries.
//!
//! A `StopQuery` is a time-limited subscription showing all line arrivals at
//! one stop. Its expiry is fixed at creation and never extended; the message
//! is removed at the first active cycle at or after the deadline, or
//! immediately when the STOP affordance fires.

use serde::{Deserialize, Serialize};

use super::{StopId, ViewKey};

/// A time-limited live view of one stop, keyed by (stop, creation time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopQuery {
    pub stop: StopId,
    /// Creation time, unix seconds.
    pub created_at: i64,
    /// Expiry deadline, unix seconds. Fixed at creation.
    pub expires_at: i64,
}

impl StopQuery {
    /// Open a query now; expiry is `now + ttl_minutes` and never moves.
    pub fn open(stop: StopId, now: i64, ttl_minutes: i64) -> Self {
        StopQuery {
            stop,
            created_at: now,
            expires_at: now + ttl_minutes * 60,
        }
    }

    /// True once the deadline has passed (inclusive).
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Whole minutes until expiry, never below 1 while the query is live.
    pub fn expires_in_minutes(&self, now: i64) -> i64 {
        ((self.expires_at - now) / 60).max(1)
    }

    /// The view identity this query renders into.
    pub fn key(&self) -> ViewKey {
        ViewKey::StopQuery {
            stop: self.stop.clone(),
            created_at: self.created_at,
        }
    }
}
