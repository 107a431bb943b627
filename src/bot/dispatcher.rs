//! Per-message dispatch
//!
//! The decision tree for every inbound message:
//!
//! - first time we've seen the sender? -> welcome message, then continue
//! - carrying a command? -> run it (or reject it if it needs a credential
//!   the user doesn't have, or echo it back if unknown)
//! - no command and no credential? -> ask the user to connect Notion
//! - no command and no database selected? -> run database selection
//! - otherwise -> relay the message contents to Notion

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::commands::{route_message, Command, Route};
use super::models::{IncomingMessage, TelegramUpdate};
use super::relay;
use crate::common::AppState;
use crate::services::NotionError;
use crate::users::{repo, NotionAuth, TelegramUser};

/// Entry point for one webhook update. The connection is the request-scoped
/// handle acquired by the webhook handler and passed down explicitly.
pub async fn dispatch_update(
    state: &AppState,
    conn: &mut SqliteConnection,
    update: &TelegramUpdate,
) -> Result<()> {
    let Some(message) = update.message.as_ref() else {
        debug!(update_id = ?update.update_id, "Update without a message, ignoring");
        return Ok(());
    };

    let Some(profile) = message.sender_profile() else {
        debug!("Message without a sender, ignoring");
        return Ok(());
    };

    if message.from.as_ref().is_some_and(|s| s.is_bot) {
        debug!("Message from a bot, ignoring");
        return Ok(());
    }

    let (user, created) = repo::track_sender(&mut *conn, &profile)
        .await
        .context("tracking sender")?;

    if created {
        info!(telegram_user_id = user.telegram_user_id, "New user");
        send_welcome_message(state, &user).await?;
    }

    let credential = repo::get_credential(&mut *conn, user.telegram_user_id)
        .await
        .context("loading credential")?;
    let has_database = credential.as_ref().is_some_and(NotionAuth::has_database);

    match route_message(message.command_text(), credential.is_some(), has_database) {
        Route::Command(cmd) => {
            handle_command(state, conn, &user, credential.as_ref(), cmd).await?
        }
        Route::CommandNeedsAuth(_) => {
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    "Not ready for that! You need to setup with Notion first",
                )
                .await?;
            send_auth_prompt(state, &user).await?;
        }
        Route::UnknownCommand(text) => {
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    &format!("You sent a command I don't understand - {}", text),
                )
                .await?;
        }
        Route::PromptAuth => send_auth_prompt(state, &user).await?,
        Route::ChooseDatabase => {
            let auth = credential
                .as_ref()
                .ok_or_else(|| anyhow!("database selection routed without a credential"))?;
            run_database_selection(state, conn, &user, auth).await?;
        }
        Route::Relay => {
            let auth = credential
                .as_ref()
                .ok_or_else(|| anyhow!("relay routed without a credential"))?;
            let text = message.text.as_deref().unwrap_or_default();
            relay::relay_message(state, &user, auth, text).await?;
        }
    }

    Ok(())
}

async fn handle_command(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &TelegramUser,
    credential: Option<&NotionAuth>,
    command: Command,
) -> Result<()> {
    debug!(command = ?command, telegram_user_id = user.telegram_user_id, "Handling command");

    match command {
        Command::Start => send_auth_prompt(state, user).await,
        Command::Help => {
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    "Some helpful message goes here about /help",
                )
                .await?;
            Ok(())
        }
        Command::Stop => {
            state
                .telegram_service
                .send_message(user.telegram_chat_id, "NOT IMPLEMENTED /stop")
                .await?;
            Ok(())
        }
        Command::About => {
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    "Some aboutful message goes here about /about",
                )
                .await?;
            Ok(())
        }
        Command::Database => {
            let auth = credential
                .ok_or_else(|| anyhow!("/database handled without a credential"))?;
            run_database_selection(state, conn, user, auth).await
        }
        Command::Reauth => {
            repo::delete_credential(&mut *conn, user.telegram_user_id)
                .await
                .context("deleting credential")?;
            send_auth_prompt(state, user).await
        }
    }
}

pub async fn send_welcome_message(state: &AppState, user: &TelegramUser) -> Result<()> {
    state
        .telegram_service
        .send_message(
            user.telegram_chat_id,
            "Hello! This little bot will create a new page in whatever database you point it at.",
        )
        .await?;

    Ok(())
}

pub async fn send_auth_prompt(state: &AppState, user: &TelegramUser) -> Result<()> {
    let login_url = state.notion_login_url(user.telegram_user_id);

    state
        .telegram_service
        .send_message(
            user.telegram_chat_id,
            &format!(
                "Visit the following URL to connect your Notion account - {} - and note for now ONLY CHOOSE ONE database!",
                login_url
            ),
        )
        .await?;

    Ok(())
}

/// How the database discovery results decide the selection step.
#[derive(Debug, PartialEq, Eq)]
pub enum DatabasePick<'a> {
    /// The integration cannot see any databases at all.
    NoneVisible,
    /// Exactly one candidate, safe to auto-select.
    Single(&'a Value),
    /// More than one candidate; selection is unsupported, refuse.
    Unsupported(usize),
}

pub fn classify_databases(results: &[Value]) -> DatabasePick<'_> {
    match results {
        [] => DatabasePick::NoneVisible,
        [only] => DatabasePick::Single(only),
        many => DatabasePick::Unsupported(many.len()),
    }
}

pub fn database_title(database: &Value) -> &str {
    database
        .get("title")
        .and_then(|t| t.get(0))
        .and_then(|t| t.get("plain_text"))
        .and_then(Value::as_str)
        .unwrap_or("Untitled")
}

/// Discover which databases the credential can see and select one if the
/// answer is unambiguous.
pub async fn run_database_selection(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &TelegramUser,
    auth: &NotionAuth,
) -> Result<()> {
    state
        .telegram_service
        .send_message(
            user.telegram_chat_id,
            "You need to tell me which database you want me to add pages to. Hang on while I show you a list...",
        )
        .await?;

    let access_token = auth
        .access_token()
        .ok_or_else(|| anyhow!("credential blob is missing an access token"))?;

    let results = match state.notion_service.list_databases(&access_token).await {
        Ok(results) => results,
        Err(NotionError::ApiError { status, .. }) => {
            info!(status = status, "Database discovery rejected by Notion");
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    "Something went wrong, try again in a few minutes!",
                )
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e).context("listing Notion databases"),
    };

    match classify_databases(&results) {
        DatabasePick::NoneVisible => {
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    "I don't have access to any databases, you may need to disconnect this integration within your Notion settings page to allow access to different databases.",
                )
                .await?;
        }
        DatabasePick::Single(database) => {
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    &format!(
                        "Found 1 database - {} - and setting that as default",
                        database_title(database)
                    ),
                )
                .await?;

            let database_id = database
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("discovered database has no id"))?;

            choose_database(state, conn, user, &access_token, database_id).await?;
        }
        DatabasePick::Unsupported(count) => {
            // TODO real selection needs /database to take a parameter
            state
                .telegram_service
                .send_message(
                    user.telegram_chat_id,
                    &format!(
                        "I found {} databases, but I can only handle one at the moment. You'll have to remove the integration and re-add it in order to choose which databases (pages) you allow me to access.",
                        count
                    ),
                )
                .await?;
        }
    }

    Ok(())
}

/// Fetch the full database object (schema included) and cache it on the
/// user's credential.
async fn choose_database(
    state: &AppState,
    conn: &mut SqliteConnection,
    user: &TelegramUser,
    access_token: &str,
    database_id: &str,
) -> Result<()> {
    let database = state
        .notion_service
        .get_database(access_token, database_id)
        .await
        .context("fetching selected database")?;

    let database_json =
        serde_json::to_string(&database).context("serializing selected database")?;

    repo::save_database(&mut *conn, user.telegram_user_id, &database_json)
        .await
        .context("caching selected database")?;

    info!(
        telegram_user_id = user.telegram_user_id,
        database_id = database_id,
        "Database selected"
    );

    Ok(())
}

/// Best-effort failure notice sent when dispatch blows up; errors sending
/// it are ignored.
pub async fn notify_failure(state: &AppState, message: Option<&IncomingMessage>) {
    if let Some(chat_id) = message.map(|m| m.chat.id) {
        let _ = state
            .telegram_service
            .send_message(chat_id, "Something went wrong, try again in a few minutes!")
            .await;
    }
}
