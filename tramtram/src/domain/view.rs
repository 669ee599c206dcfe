//! View identities.

use serde::{Deserialize, Serialize};

use super::StopId;

/// The identity of one outbound message's content source.
///
/// The reconciler produces exactly one message per desired view: dashboards
/// first in trip configuration order, then stop queries in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKey {
    /// The persistent, cycle-refreshed card for one trip.
    Dashboard { trip: String },
    /// A time-limited card for all arrivals at one stop.
    StopQuery { stop: StopId, created_at: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let keys = vec![
            ViewKey::Dashboard {
                trip: "Home → Office".to_string(),
            },
            ViewKey::StopQuery {
                stop: StopId::new("1132").unwrap(),
                created_at: 1_700_000_000,
            },
        ];
        let json = serde_json::to_string(&keys).unwrap();
        let back: Vec<ViewKey> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, keys);
    }
}
