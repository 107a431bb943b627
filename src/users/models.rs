//! User and credential data models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Telegram user database model
///
/// One row per platform user, created the first time a message from them is
/// seen. Timestamps are stored as RFC 3339 text.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct TelegramUser {
    pub telegram_user_id: i64,
    pub telegram_chat_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub language_code: String,
    pub first_seen: String,
    pub last_seen: String,
}

/// Notion credential database model
///
/// At most one per user. `token` holds the raw OAuth token response as an
/// opaque JSON blob; `database_json` caches the selected database object
/// (id + schema) once the user has picked one.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct NotionAuth {
    pub telegram_user_id: i64,
    pub provider: String,
    pub token: String,
    pub database_json: Option<String>,
}

impl NotionAuth {
    /// Access token extracted from the stored credential blob.
    pub fn access_token(&self) -> Option<String> {
        serde_json::from_str::<Value>(&self.token)
            .ok()?
            .get("access_token")?
            .as_str()
            .map(str::to_string)
    }

    /// The cached database object, if one has been selected.
    pub fn database(&self) -> Option<Value> {
        self.database_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    pub fn has_database(&self) -> bool {
        self.database_json.is_some()
    }
}
