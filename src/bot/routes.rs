//! Bot-facing routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the bot router
///
/// # Routes
/// - `POST /` - Telegram webhook
/// - `GET /ping` - Health check
/// - `GET|POST /setup` - Register the webhook with Telegram
pub fn bot_routes() -> Router {
    Router::new()
        .route("/", post(handlers::webhook))
        .route("/ping", get(handlers::ping))
        .route("/setup", get(handlers::setup_webhook).post(handlers::setup_webhook))
}
