// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::{NotionService, TelegramService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub secret_key: String,
    pub public_base_url: String,
    pub telegram_service: Arc<TelegramService>,
    pub notion_service: Arc<NotionService>,
}

impl AppState {
    /// Absolute URL a user visits to start connecting their Notion account.
    pub fn notion_login_url(&self, telegram_user_id: i64) -> String {
        format!(
            "{}/notion/{}",
            self.public_base_url.trim_end_matches('/'),
            telegram_user_id
        )
    }

    /// Redirect URI registered with Notion for the OAuth callback.
    pub fn notion_redirect_uri(&self) -> String {
        format!(
            "{}/notion/callback",
            self.public_base_url.trim_end_matches('/')
        )
    }

    /// URL Telegram should deliver webhook updates to.
    pub fn webhook_url(&self) -> String {
        format!("{}/", self.public_base_url.trim_end_matches('/'))
    }
}
