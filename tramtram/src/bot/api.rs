//! Incoming Bot API payloads.
//!
//! Only the fields the dispatcher looks at; everything else Telegram sends
//! is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 12,
                "message": {
                    "message_id": 34,
                    "chat": {"id": 56, "type": "private"},
                    "from": {"id": 56, "is_bot": false, "first_name": "x"},
                    "text": "1132"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(update.update_id, 12);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 56);
        assert_eq!(message.text.as_deref(), Some("1132"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn parses_callback_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 13,
                "callback_query": {
                    "id": "abc",
                    "data": "stop:1132:1700000000",
                    "message": {
                        "message_id": 35,
                        "chat": {"id": 56}
                    }
                }
            }"#,
        )
        .unwrap();
        let callback = update.callback_query.unwrap();
        assert_eq!(callback.id, "abc");
        assert_eq!(callback.data.as_deref(), Some("stop:1132:1700000000"));
        assert_eq!(callback.message.unwrap().chat.id, 56);
    }

    #[test]
    fn tolerates_updates_without_message() {
        let update: Update = serde_json::from_str(r#"{"update_id": 14}"#).unwrap();
        assert!(update.message.is_none());
        assert!(update.callback_query.is_none());
    }
}
