//! Notion authorization routes

use axum::{routing::get, Router};

use super::handlers;

/// Creates and returns the authorization router
///
/// # Routes
/// - `GET /notion/:telegram_user_id` - Start the OAuth flow for a user
/// - `GET /notion/callback` - OAuth callback / post-authorization landing
pub fn notion_routes() -> Router {
    Router::new()
        .route("/notion/callback", get(handlers::auth_callback))
        .route("/notion/:telegram_user_id", get(handlers::auth_start))
}
