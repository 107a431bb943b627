//! Inbound webhook payload models
//!
//! Mirrors the slice of Telegram's update object the service cares about:
//!
//! ```json
//! {
//!   "update_id": 263842683,
//!   "message": {
//!     "message_id": 2,
//!     "chat": { "id": 983713751 },
//!     "from": {
//!       "id": 983713751, "is_bot": false, "first_name": "Matt",
//!       "last_name": "Wilson", "username": "ironslob", "language_code": "en"
//!     },
//!     "text": "/start",
//!     "entities": [ { "type": "bot_command", "offset": 0, "length": 6 } ]
//!   }
//! }
//! ```

use serde::Deserialize;

use crate::users::repo::SenderProfile;

const DEFAULT_LANGUAGE_CODE: &str = "en";

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: Option<i64>,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: Option<i64>,
    pub chat: Chat,
    pub from: Option<Sender>,
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<MessageEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: usize,
    pub length: usize,
}

impl IncomingMessage {
    /// Text slice of the first bot_command entity, if any.
    pub fn command_text(&self) -> Option<&str> {
        let text = self.text.as_deref()?;
        let entity = self.entities.iter().find(|e| e.kind == "bot_command")?;

        text.get(entity.offset..entity.offset + entity.length)
    }

    /// Profile fields for user tracking. None when the message has no
    /// sender (e.g. channel posts).
    pub fn sender_profile(&self) -> Option<SenderProfile> {
        let sender = self.from.as_ref()?;

        Some(SenderProfile {
            telegram_user_id: sender.id,
            telegram_chat_id: self.chat.id,
            first_name: sender.first_name.clone().unwrap_or_default(),
            last_name: sender.last_name.clone().unwrap_or_default(),
            username: sender.username.clone().unwrap_or_default(),
            language_code: sender
                .language_code
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE_CODE.to_string()),
        })
    }
}
