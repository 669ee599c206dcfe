//! In-memory transport for tests and development.
//!
//! Tracks which messages are live and records every operation so tests can
//! assert exactly what the reconciler emitted.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{Affordance, ChatId, MessageId, Transport, TransportError};

/// One recorded transport operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentOp {
    Create {
        chat: ChatId,
        id: MessageId,
        text: String,
    },
    Edit {
        chat: ChatId,
        id: MessageId,
        text: String,
    },
    Delete {
        chat: ChatId,
        id: MessageId,
    },
}

/// Transport double handing out sequential message ids.
#[derive(Debug)]
pub struct MemoryTransport {
    next_id: AtomicI64,
    live: Mutex<HashSet<(ChatId, MessageId)>>,
    ops: Mutex<Vec<SentOp>>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            live: Mutex::new(HashSet::new()),
            ops: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation recorded so far, in order.
    pub fn ops(&self) -> Vec<SentOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Number of operations recorded so far.
    pub fn op_count(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Forget recorded operations (live messages stay live).
    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// True if the message currently exists.
    pub fn is_live(&self, chat: ChatId, id: MessageId) -> bool {
        self.live.lock().unwrap().contains(&(chat, id))
    }

    /// Number of live messages in a chat.
    pub fn live_count(&self, chat: ChatId) -> usize {
        self.live.lock().unwrap().iter().filter(|(c, _)| *c == chat).count()
    }

    /// Remove a message out-of-band, as a user deleting it would.
    pub fn drop_message(&self, chat: ChatId, id: MessageId) {
        self.live.lock().unwrap().remove(&(chat, id));
    }
}

impl Transport for MemoryTransport {
    async fn create(
        &self,
        chat: ChatId,
        text: &str,
        _affordance: Option<&Affordance>,
    ) -> Result<MessageId, TransportError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.live.lock().unwrap().insert((chat, id));
        self.ops.lock().unwrap().push(SentOp::Create {
            chat,
            id,
            text: text.to_string(),
        });
        Ok(id)
    }

    async fn edit(
        &self,
        chat: ChatId,
        id: MessageId,
        text: &str,
        _affordance: Option<&Affordance>,
    ) -> Result<(), TransportError> {
        self.ops.lock().unwrap().push(SentOp::Edit {
            chat,
            id,
            text: text.to_string(),
        });
        if !self.live.lock().unwrap().contains(&(chat, id)) {
            return Err(TransportError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, chat: ChatId, id: MessageId) -> Result<(), TransportError> {
        self.ops.lock().unwrap().push(SentOp::Delete { chat, id });
        if !self.live.lock().unwrap().remove(&(chat, id)) {
            return Err(TransportError::NotFound);
        }
        Ok(())
    }
}
