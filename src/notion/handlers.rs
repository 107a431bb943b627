//! Notion authorization flow handlers

use axum::extract::{Extension, Path, Query};
use axum::response::{Html, Redirect};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use super::models::{issue_state_token, verify_state_token};
use crate::bot::dispatcher;
use crate::common::{ApiError, AppState};
use crate::services::monitoring;
use crate::users::repo;

/// GET /notion/:telegram_user_id
///
/// Entry point of the authorization flow: mints a state token for the user
/// and redirects them into Notion's consent page.
pub async fn auth_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(telegram_user_id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let state = state_lock.read().await.clone();

    let mut conn = state.db.acquire().await?;
    if repo::find_user(&mut conn, telegram_user_id).await?.is_none() {
        return Err(ApiError::NotFound(
            "unknown telegram user - message the bot first".to_string(),
        ));
    }

    let token = issue_state_token(&state.secret_key, telegram_user_id).map_err(|e| {
        error!(error = %e, "Failed to issue state token");
        ApiError::InternalServer("failed to start authorization".to_string())
    })?;

    let auth_url = state
        .notion_service
        .authorization_url(&state.notion_redirect_uri(), &token);

    info!(telegram_user_id = telegram_user_id, "Starting Notion OAuth flow");

    Ok(Redirect::to(&auth_url))
}

/// GET /notion/callback
///
/// Post-authorization landing: exchanges the code, stores the credential,
/// then immediately runs database discovery/selection so the user gets their
/// next step in chat before they even switch back to Telegram.
pub async fn auth_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    if let Some(oauth_error) = params.get("error") {
        error!(oauth_error = %oauth_error, "Notion OAuth returned error");
        return Ok(Html(error_page(oauth_error)));
    }

    let code = params
        .get("code")
        .ok_or_else(|| ApiError::BadRequest("no authorization code provided".to_string()))?;
    let state_token = params
        .get("state")
        .ok_or_else(|| ApiError::BadRequest("no state token provided".to_string()))?;

    let state = state_lock.read().await.clone();

    let telegram_user_id =
        verify_state_token(&state.secret_key, state_token).map_err(|e| {
            error!(error = %e, "State token verification failed");
            ApiError::Unauthorized("invalid or expired state token".to_string())
        })?;

    let token = state
        .notion_service
        .exchange_code(code, &state.notion_redirect_uri())
        .await
        .map_err(|e| {
            error!(error = %e, "Notion token exchange failed");
            ApiError::InternalServer("token exchange failed".to_string())
        })?;

    let mut conn = state.db.acquire().await?;

    let user = repo::find_user(&mut conn, telegram_user_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound("unknown telegram user - message the bot first".to_string())
        })?;

    repo::save_credential(&mut conn, telegram_user_id, &token.to_string()).await?;

    info!(telegram_user_id = telegram_user_id, "Notion credential stored");

    let auth = repo::get_credential(&mut conn, telegram_user_id)
        .await?
        .ok_or_else(|| ApiError::InternalServer("credential vanished".to_string()))?;

    if let Err(e) = dispatcher::run_database_selection(&state, &mut conn, &user, &auth).await {
        monitoring::report_error(&e, "post-auth database selection failed");
        return Err(ApiError::InternalServer(
            "database selection failed".to_string(),
        ));
    }

    Ok(Html(confirmation_page()))
}

fn confirmation_page() -> String {
    r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>All done</title>
        <style>
            body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }
            .success { background: #efe; border: 1px solid #cfc; padding: 20px; border-radius: 8px; }
        </style>
    </head>
    <body>
        <div class="success">
            <h1>Connected!</h1>
            <p>Your Notion account is linked. Head back to Telegram - the bot has sent you the next step.</p>
        </div>
    </body>
    </html>
    "#
    .to_string()
}

fn error_page(oauth_error: &str) -> String {
    format!(
        r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Authorization failed</title>
        <style>
            body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }}
            .error {{ background: #fee; border: 1px solid #fcc; padding: 20px; border-radius: 8px; }}
        </style>
    </head>
    <body>
        <div class="error">
            <h1>Authorization failed</h1>
            <p>Error: {}</p>
            <p>Head back to Telegram and send /start to try again.</p>
        </div>
    </body>
    </html>
    "#,
        oauth_error
    )
}
