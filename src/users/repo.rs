//! Repository functions for users and credentials
//!
//! Every function takes the request-scoped connection explicitly, so the
//! store stays independent of any particular request lifecycle. Each call
//! commits on its own; there is no cross-call transaction.

use chrono::Utc;
use sqlx::SqliteConnection;

use super::models::{NotionAuth, TelegramUser};

/// Profile fields pulled out of an inbound message's sender.
#[derive(Debug, Clone)]
pub struct SenderProfile {
    pub telegram_user_id: i64,
    pub telegram_chat_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub language_code: String,
}

pub async fn find_user(
    conn: &mut SqliteConnection,
    telegram_user_id: i64,
) -> Result<Option<TelegramUser>, sqlx::Error> {
    sqlx::query_as::<_, TelegramUser>(
        "SELECT * FROM telegram_users WHERE telegram_user_id = ?",
    )
    .bind(telegram_user_id)
    .fetch_optional(conn)
    .await
}

/// Record the sender of a message: insert on first contact, otherwise
/// refresh the chat id, profile fields and last_seen. Returns the stored
/// user plus whether this was the first time they were seen.
pub async fn track_sender(
    conn: &mut SqliteConnection,
    profile: &SenderProfile,
) -> Result<(TelegramUser, bool), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let existing = find_user(&mut *conn, profile.telegram_user_id).await?;

    let created = existing.is_none();

    match existing {
        None => {
            sqlx::query(
                r#"
                INSERT INTO telegram_users
                    (telegram_user_id, telegram_chat_id, first_name, last_name,
                     username, language_code, first_seen, last_seen)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(profile.telegram_user_id)
            .bind(profile.telegram_chat_id)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.username)
            .bind(&profile.language_code)
            .bind(&now)
            .bind(&now)
            .execute(&mut *conn)
            .await?;
        }
        Some(_) => {
            sqlx::query(
                r#"
                UPDATE telegram_users
                SET telegram_chat_id = ?, first_name = ?, last_name = ?,
                    username = ?, language_code = ?, last_seen = ?
                WHERE telegram_user_id = ?
                "#,
            )
            .bind(profile.telegram_chat_id)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.username)
            .bind(&profile.language_code)
            .bind(&now)
            .bind(profile.telegram_user_id)
            .execute(&mut *conn)
            .await?;
        }
    }

    let user = find_user(&mut *conn, profile.telegram_user_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

    Ok((user, created))
}

pub async fn get_credential(
    conn: &mut SqliteConnection,
    telegram_user_id: i64,
) -> Result<Option<NotionAuth>, sqlx::Error> {
    sqlx::query_as::<_, NotionAuth>(
        "SELECT telegram_user_id, provider, token, database_json
         FROM notion_auth WHERE telegram_user_id = ?",
    )
    .bind(telegram_user_id)
    .fetch_optional(conn)
    .await
}

/// Store a freshly obtained credential blob. Replaces any existing
/// credential and clears the previously selected database, which forces the
/// selection step to run again.
pub async fn save_credential(
    conn: &mut SqliteConnection,
    telegram_user_id: i64,
    token_json: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO notion_auth (telegram_user_id, provider, token, database_json)
        VALUES (?, 'notion', ?, NULL)
        ON CONFLICT(telegram_user_id)
        DO UPDATE SET token = excluded.token, database_json = NULL
        "#,
    )
    .bind(telegram_user_id)
    .bind(token_json)
    .execute(conn)
    .await?;

    Ok(())
}

/// Cache the selected database object on the user's credential.
pub async fn save_database(
    conn: &mut SqliteConnection,
    telegram_user_id: i64,
    database_json: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE notion_auth SET database_json = ? WHERE telegram_user_id = ?")
        .bind(database_json)
        .bind(telegram_user_id)
        .execute(conn)
        .await?;

    Ok(())
}

pub async fn delete_credential(
    conn: &mut SqliteConnection,
    telegram_user_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM notion_auth WHERE telegram_user_id = ?")
        .bind(telegram_user_id)
        .execute(conn)
        .await?;

    Ok(())
}
