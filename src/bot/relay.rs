//! Message relay: plain text in, Notion page out
//!
//! The selected database's schema names exactly one property of type
//! "title"; the message text becomes that property's rich-text content on a
//! new page.

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::common::AppState;
use crate::services::NotionError;
use crate::users::{NotionAuth, TelegramUser};

#[derive(Debug, Error, PartialEq)]
pub enum RelayError {
    #[error("database schema has no title property")]
    MissingTitleProperty,

    #[error("database object has no id")]
    MissingDatabaseId,
}

/// Name of the schema property whose type is "title".
pub fn title_property(database: &Value) -> Option<&str> {
    database
        .get("properties")?
        .as_object()?
        .iter()
        .find(|(_, prop)| prop.get("type").and_then(Value::as_str) == Some("title"))
        .map(|(name, _)| name.as_str())
}

/// Create-page payload embedding `text` as the title of a new page in
/// `database`.
pub fn build_page_payload(database: &Value, text: &str) -> Result<Value, RelayError> {
    let database_id = database
        .get("id")
        .and_then(Value::as_str)
        .ok_or(RelayError::MissingDatabaseId)?;
    let title_property = title_property(database).ok_or(RelayError::MissingTitleProperty)?;

    Ok(json!({
        "parent": {
            "type": "database_id",
            "database_id": database_id,
        },
        "properties": {
            title_property: {
                "type": "title",
                "title": [
                    {
                        "type": "text",
                        "text": {
                            "content": text,
                        }
                    }
                ]
            }
        }
    }))
}

/// File a message away as a new page and acknowledge in chat.
///
/// A non-success response from Notion is reported to the user as a fixed
/// error string and is not retried; transport failures bubble up to the
/// webhook boundary.
pub async fn relay_message(
    state: &AppState,
    user: &TelegramUser,
    auth: &NotionAuth,
    text: &str,
) -> Result<()> {
    let database = auth
        .database()
        .ok_or_else(|| anyhow!("relay reached without a selected database"))?;
    let access_token = auth
        .access_token()
        .ok_or_else(|| anyhow!("credential blob is missing an access token"))?;

    let payload = build_page_payload(&database, text).context("building page payload")?;

    let reply = match state.notion_service.create_page(&access_token, &payload).await {
        Ok(()) => "Done! ✅",
        Err(NotionError::ApiError { status, .. }) => {
            warn!(status = status, "Notion rejected page creation");
            "Error from Notion 😩"
        }
        Err(e) => return Err(e).context("creating Notion page"),
    };

    state
        .telegram_service
        .send_message(user.telegram_chat_id, reply)
        .await
        .context("sending relay acknowledgment")?;

    Ok(())
}
