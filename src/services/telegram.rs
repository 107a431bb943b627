//! Telegram Bot API bindings
//!
//! Thin wrapper over the handful of Bot API methods the service needs:
//! sending chat messages and registering the webhook.

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Telegram API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },
}

impl TelegramError {
    /// Transport-level failures are worth retrying; API rejections are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, TelegramError::RequestFailed(_))
    }
}

pub struct TelegramService {
    client: Client,
    token: String,
}

impl TelegramService {
    pub fn new(client: Client, token: String) -> Self {
        Self { client, token }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    /// Send a plain text message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        debug!(chat_id = chat_id, "Sending Telegram message");

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| TelegramError::RequestFailed(e.to_string()))?;

        Self::check_response(response).await
    }

    /// Register `url` as the webhook Telegram delivers updates to.
    pub async fn set_webhook(&self, url: &str) -> Result<(), TelegramError> {
        debug!(url = url, "Registering Telegram webhook");

        let response = self
            .client
            .post(self.method_url("setWebhook"))
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| TelegramError::RequestFailed(e.to_string()))?;

        Self::check_response(response).await
    }

    async fn check_response(response: reqwest::Response) -> Result<(), TelegramError> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, body = %body, "Telegram API call failed");
            return Err(TelegramError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        // Telegram wraps results in { "ok": bool, ... } even on HTTP 200.
        let body: Value = response
            .json()
            .await
            .map_err(|e| TelegramError::RequestFailed(e.to_string()))?;

        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            error!(body = %body, "Telegram API reported failure");
            return Err(TelegramError::ApiError {
                status: status.as_u16(),
                body: body.to_string(),
            });
        }

        Ok(())
    }
}
