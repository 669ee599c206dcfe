//! In-memory state store for tests and development.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::transport::ChatId;

use super::{StateStore, StoreError, UserState};

/// Volatile store keeping every record in a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<ChatId, UserState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, as if it had been persisted by a previous run.
    pub fn seed(&self, chat: ChatId, state: UserState) {
        self.inner.lock().unwrap().insert(chat, state);
    }

    /// Current persisted copy of a user's record.
    pub fn get(&self, chat: ChatId) -> Option<UserState> {
        self.inner.lock().unwrap().get(&chat).cloned()
    }
}

impl StateStore for MemoryStore {
    fn load_all(&self) -> Result<HashMap<ChatId, UserState>, StoreError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn save(&self, chat: ChatId, state: &UserState) -> Result<(), StoreError> {
        self.inner.lock().unwrap().insert(chat, state.clone());
        Ok(())
    }
}
