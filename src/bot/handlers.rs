//! Webhook and operational handlers

use axum::extract::{Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

use super::dispatcher;
use super::models::TelegramUpdate;
use crate::common::{ApiError, AppState};
use crate::services::{monitoring, RetryPolicy, TelegramError};

/// POST /
///
/// Telegram webhook. Missing or undecodable bodies are a client error;
/// anything that fails past that point is reported to the monitoring sink,
/// surfaced as a best-effort chat reply, and returned as a 500.
pub async fn webhook(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    payload: Option<Json<TelegramUpdate>>,
) -> Result<Json<Value>, ApiError> {
    let Some(Json(update)) = payload else {
        return Err(ApiError::BadRequest("missing webhook payload".to_string()));
    };

    let state = state_lock.read().await.clone();

    // Request-scoped handle: acquired here, handed down the dispatch chain,
    // released back to the pool when this handler returns.
    let mut conn = state.db.acquire().await?;

    match dispatcher::dispatch_update(&state, &mut conn, &update).await {
        Ok(()) => Ok(Json(json!({ "ok": 1 }))),
        Err(e) => {
            monitoring::report_error(&e, "webhook dispatch failed");
            dispatcher::notify_failure(&state, update.message.as_ref()).await;
            Err(ApiError::InternalServer("webhook handling failed".to_string()))
        }
    }
}

/// GET /ping
pub async fn ping() -> Json<Value> {
    Json(json!({ "ok": 1 }))
}

/// GET|POST /setup
///
/// Registers this service's public URL as the bot webhook. Transient
/// transport failures are retried with backoff.
pub async fn setup_webhook(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let url = state.webhook_url();

    info!(url = %url, "Registering webhook with Telegram");

    let policy = RetryPolicy::new(3, Duration::from_millis(500));

    policy
        .run(
            || state.telegram_service.set_webhook(&url),
            TelegramError::is_transient,
        )
        .await
        .map_err(|e| {
            ApiError::InternalServer(format!("failed to register webhook: {}", e))
        })?;

    Ok(Json(json!({ "ok": 1 })))
}
