//! Messaging transport contract.
//!
//! The engine addresses messages through opaque chat/message identifiers;
//! everything Telegram-specific lives behind the `Transport` trait. `edit`
//! and `delete` on an already-gone message fail softly with `NotFound`.

mod error;
mod memory;
mod telegram;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::StopId;

pub use error::TransportError;
pub use memory::{MemoryTransport, SentOp};
pub use telegram::TelegramTransport;

/// Opaque chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Opaque message identifier within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Interactive control attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    /// A STOP button dismissing the stop query it is attached to.
    DismissQuery { stop: StopId, created_at: i64 },
}

impl Affordance {
    /// Encode into transport callback data (`stop:<id>:<created_at>`).
    pub fn callback_data(&self) -> String {
        match self {
            Affordance::DismissQuery { stop, created_at } => {
                format!("stop:{stop}:{created_at}")
            }
        }
    }

    /// Decode transport callback data; `None` for anything unrecognized.
    pub fn parse_callback(data: &str) -> Option<Affordance> {
        let rest = data.strip_prefix("stop:")?;
        let (stop, created_at) = rest.rsplit_once(':')?;
        Some(Affordance::DismissQuery {
            stop: StopId::new(stop).ok()?,
            created_at: created_at.parse().ok()?,
        })
    }
}

/// Outbound messaging operations.
pub trait Transport: Send + Sync {
    /// Post a new message; returns its identifier.
    fn create(
        &self,
        chat: ChatId,
        text: &str,
        affordance: Option<&Affordance>,
    ) -> impl Future<Output = Result<MessageId, TransportError>> + Send;

    /// Replace an existing message's content in place.
    fn edit(
        &self,
        chat: ChatId,
        id: MessageId,
        text: &str,
        affordance: Option<&Affordance>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Remove a message.
    fn delete(
        &self,
        chat: ChatId,
        id: MessageId,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}
