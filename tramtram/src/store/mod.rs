//! Persistent per-user state.
//!
//! One durable record per user: the trip configuration, the currently
//! tracked outbound message identifiers, and any active stop queries.
//! Records must round-trip exactly: reloading a saved record and
//! immediately reconciling emits no spurious operations.

mod error;
mod json;
mod memory;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{StopQuery, Trip, ViewKey};
use crate::transport::{ChatId, MessageId};

pub use error::StoreError;
pub use json::JsonStore;
pub use memory::MemoryStore;

/// One tracked outbound message: transport id, owning view, and the hash of
/// the last rendered content (used to skip no-op edits).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub id: MessageId,
    pub view: ViewKey,
    #[serde(default)]
    pub hash: Option<u64>,
}

/// Per-user aggregate: trips, tracked messages, active stop queries, and
/// bookkeeping message ids (welcome cards, undeletable incoming messages)
/// that are only cleaned up on `/start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub messages: Vec<OutboundMessage>,
    #[serde(default)]
    pub queries: Vec<StopQuery>,
    #[serde(default)]
    pub extra_ids: Vec<MessageId>,
}

/// Durable store of every user's state.
///
/// The engine calls `load_all` once before the first cycle and `save` after
/// any mutation to a user's tracked messages or queries. Trip graphs are
/// edited out of band in the data files; the engine never writes them.
pub trait StateStore: Send + Sync {
    fn load_all(&self) -> Result<HashMap<ChatId, UserState>, StoreError>;
    fn save(&self, chat: ChatId, state: &UserState) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;

    #[test]
    fn user_state_round_trips_through_json() {
        let state = UserState {
            trips: vec![],
            messages: vec![OutboundMessage {
                id: MessageId(17),
                view: ViewKey::Dashboard {
                    trip: "Home → Office".to_string(),
                },
                hash: Some(0xdead_beef),
            }],
            queries: vec![StopQuery::open(
                StopId::new("1132").unwrap(),
                1_700_000_000,
                15,
            )],
            extra_ids: vec![MessageId(3)],
        };

        let json = serde_json::to_string_pretty(&state).unwrap();
        let back: UserState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn missing_fields_default() {
        let state: UserState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, UserState::default());
    }
}
