//! Telegram update loop and command dispatch.
//!
//! Long-polls `getUpdates` and routes each update to an engine trigger:
//! `/start`, `/refresh`, a bare stop number, or a STOP button press.
//! Incoming user messages are deleted after handling so the chat only ever
//! contains the bot's live cards.

pub mod api;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::StopId;
use crate::engine::Engine;
use crate::provider::ArrivalProvider;
use crate::store::StateStore;
use crate::transport::{Affordance, ChatId, MessageId, TelegramTransport};

use api::{CallbackQuery, IncomingMessage, Update};

const POLL_TIMEOUT_SECS: u64 = 50;
const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// The update-polling front end over the engine.
pub struct Bot<P, S> {
    engine: Arc<Engine<P, TelegramTransport, S>>,
    transport: TelegramTransport,
}

impl<P, S> Bot<P, S>
where
    P: ArrivalProvider,
    S: StateStore,
{
    pub fn new(engine: Arc<Engine<P, TelegramTransport, S>>) -> Self {
        let transport = engine.transport().clone();
        Bot { engine, transport }
    }

    /// Poll for updates forever.
    pub async fn run(&self) {
        let mut offset = 0;
        loop {
            match self.transport.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.dispatch(update).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "getUpdates failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }

    async fn dispatch(&self, update: Update) {
        if let Some(message) = update.message {
            self.handle_message(message).await;
        } else if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await;
        }
    }

    async fn handle_message(&self, message: IncomingMessage) {
        let chat = ChatId(message.chat.id);
        let incoming = MessageId(message.message_id);
        let Some(text) = message.text.as_deref().map(str::trim) else {
            return;
        };

        let result = match text {
            "/start" => {
                self.engine.consume_incoming(chat, incoming).await;
                self.engine.start(chat).await
            }
            "/refresh" => {
                self.engine.consume_incoming(chat, incoming).await;
                self.engine.refresh(chat).await
            }
            _ if text.chars().all(|c| c.is_ascii_digit()) && !text.is_empty() => {
                self.engine.consume_incoming(chat, incoming).await;
                match StopId::new(text) {
                    Ok(stop) => self.engine.open_stop_query(chat, stop).await,
                    Err(_) => Ok(()),
                }
            }
            other => {
                debug!(%chat, text = other, "ignoring unrecognized message");
                return;
            }
        };
        if let Err(e) = result {
            warn!(%chat, error = %e, "state not persisted after command");
        }
    }

    async fn handle_callback(&self, callback: CallbackQuery) {
        if let Err(e) = self.transport.answer_callback(&callback.id).await {
            debug!(error = %e, "answerCallbackQuery failed");
        }
        let Some(chat) = callback.message.as_ref().map(|m| ChatId(m.chat.id)) else {
            return;
        };
        let Some(affordance) = callback.data.as_deref().and_then(Affordance::parse_callback)
        else {
            debug!(%chat, "ignoring unrecognized callback");
            return;
        };
        let Affordance::DismissQuery { stop, created_at } = affordance;
        if let Err(e) = self.engine.dismiss_query(chat, stop, created_at).await {
            warn!(%chat, error = %e, "state not persisted after dismissal");
        }
    }
}
