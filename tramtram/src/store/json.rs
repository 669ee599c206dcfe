//! JSON-file-per-user state store.
//!
//! Each user's record lives in `<dir>/<chat_id>.json`. Unparseable files are
//! skipped with a warning at load: one corrupt record must not take the
//! service down.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::transport::ChatId;

use super::{StateStore, StoreError, UserState};

/// Durable store writing one JSON file per user.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn user_path(&self, chat: ChatId) -> PathBuf {
        self.dir.join(format!("{}.json", chat.0))
    }
}

impl StateStore for JsonStore {
    fn load_all(&self) -> Result<HashMap<ChatId, UserState>, StoreError> {
        let mut users = HashMap::new();
        if !self.dir.exists() {
            return Ok(users);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(chat) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i64>().ok())
                .map(ChatId)
            else {
                continue;
            };
            let state = fs::read_to_string(&path)
                .map_err(StoreError::from)
                .and_then(|text| Ok(serde_json::from_str::<UserState>(&text)?));
            match state {
                Ok(state) => {
                    users.insert(chat, state);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable user state file");
                }
            }
        }
        Ok(users)
    }

    fn save(&self, chat: ChatId, state: &UserState) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(state)?;
        // Write-then-rename so a crash mid-write never clobbers the record.
        let tmp = self.dir.join(format!("{}.json.tmp", chat.0));
        fs::write(&tmp, text)?;
        fs::rename(&tmp, self.user_path(chat))?;
        Ok(())
    }
}
