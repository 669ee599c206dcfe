//! Telegram Bot API transport.
//!
//! Thin JSON client over `api.telegram.org`. "Message not found" and
//! "message is not modified" rejections are mapped to soft errors so the
//! reconciler can drop or keep identifiers without special-casing Telegram.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::bot::api::Update;

use super::{Affordance, ChatId, MessageId, Transport, TransportError};

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramTransport {
    http: reqwest::Client,
    base: String,
}

impl TelegramTransport {
    /// Create a client for the given bot token.
    pub fn new(token: &str) -> Result<Self, TransportError> {
        // Long enough for getUpdates long polls.
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base: format!("https://api.telegram.org/bot{token}"),
        })
    }

    /// Invoke one Bot API method, mapping rejections to soft errors.
    pub(crate) async fn call(
        &self,
        method: &str,
        payload: Value,
    ) -> Result<Value, TransportError> {
        let response = self
            .http
            .post(format!("{}/{method}", self.base))
            .json(&payload)
            .send()
            .await?;
        let body: ApiResponse = response.json().await?;
        if body.ok {
            return Ok(body.result.unwrap_or(Value::Null));
        }
        let description = body.description.unwrap_or_default();
        Err(classify_rejection(&description))
    }

    fn reply_markup(affordance: &Affordance) -> Value {
        json!({
            "inline_keyboard": [[{
                "text": "🛑 STOP",
                "callback_data": affordance.callback_data(),
            }]]
        })
    }

    /// Long-poll for incoming updates.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        let result = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": timeout_secs,
                    "allowed_updates": ["message", "callback_query"],
                }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| TransportError::Api(format!("bad getUpdates payload: {e}")))
    }

    /// Acknowledge a callback query so the client stops its spinner.
    pub async fn answer_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        self.call(
            "answerCallbackQuery",
            json!({ "callback_query_id": callback_id }),
        )
        .await?;
        Ok(())
    }
}

fn classify_rejection(description: &str) -> TransportError {
    let lower = description.to_lowercase();
    if lower.contains("not found") {
        TransportError::NotFound
    } else if lower.contains("not modified") {
        TransportError::NotModified
    } else {
        TransportError::Api(description.to_string())
    }
}

impl Transport for TelegramTransport {
    async fn create(
        &self,
        chat: ChatId,
        text: &str,
        affordance: Option<&Affordance>,
    ) -> Result<MessageId, TransportError> {
        let mut payload = json!({
            "chat_id": chat.0,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(affordance) = affordance {
            payload["reply_markup"] = Self::reply_markup(affordance);
        }
        let result = self.call("sendMessage", payload).await?;
        let sent: SentMessage = serde_json::from_value(result)
            .map_err(|e| TransportError::Api(format!("bad sendMessage payload: {e}")))?;
        Ok(MessageId(sent.message_id))
    }

    async fn edit(
        &self,
        chat: ChatId,
        id: MessageId,
        text: &str,
        affordance: Option<&Affordance>,
    ) -> Result<(), TransportError> {
        let mut payload = json!({
            "chat_id": chat.0,
            "message_id": id.0,
            "text": text,
            "parse_mode": "Markdown",
        });
        if let Some(affordance) = affordance {
            payload["reply_markup"] = Self::reply_markup(affordance);
        }
        self.call("editMessageText", payload).await?;
        Ok(())
    }

    async fn delete(&self, chat: ChatId, id: MessageId) -> Result<(), TransportError> {
        self.call(
            "deleteMessage",
            json!({ "chat_id": chat.0, "message_id": id.0 }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_classification() {
        assert!(matches!(
            classify_rejection("Bad Request: message to edit not found"),
            TransportError::NotFound
        ));
        assert!(matches!(
            classify_rejection("Bad Request: message to delete not found"),
            TransportError::NotFound
        ));
        assert!(matches!(
            classify_rejection("Bad Request: message is not modified"),
            TransportError::NotModified
        ));
        assert!(matches!(
            classify_rejection("Forbidden: bot was blocked by the user"),
            TransportError::Api(_)
        ));
    }

    #[test]
    fn client_creation() {
        assert!(TelegramTransport::new("123:abc").is_ok());
    }
}
