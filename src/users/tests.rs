//! Tests for the users module
//!
//! These tests verify user tracking and credential storage against an
//! in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::migrations;
    use crate::users::repo::{self, SenderProfile};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        migrations::run_migrations(&pool).await.unwrap();

        pool
    }

    fn profile(user_id: i64, chat_id: i64) -> SenderProfile {
        SenderProfile {
            telegram_user_id: user_id,
            telegram_chat_id: chat_id,
            first_name: "Matt".to_string(),
            last_name: "Wilson".to_string(),
            username: "ironslob".to_string(),
            language_code: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_first_contact_creates_user_with_seen_timestamps() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let (user, created) = repo::track_sender(&mut conn, &profile(42, 100))
            .await
            .unwrap();

        assert!(created);
        assert_eq!(user.telegram_user_id, 42);
        assert_eq!(user.telegram_chat_id, 100);
        assert!(!user.first_seen.is_empty());
        assert_eq!(user.first_seen, user.last_seen);
    }

    #[tokio::test]
    async fn test_returning_sender_is_not_created_again() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        let (_, created_first) = repo::track_sender(&mut conn, &profile(42, 100))
            .await
            .unwrap();
        let (_, created_second) = repo::track_sender(&mut conn, &profile(42, 100))
            .await
            .unwrap();

        assert!(created_first);
        assert!(!created_second);
    }

    #[tokio::test]
    async fn test_returning_sender_refreshes_chat_and_profile() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        repo::track_sender(&mut conn, &profile(42, 100)).await.unwrap();

        let mut updated = profile(42, 200);
        updated.username = "newname".to_string();

        let (user, created) = repo::track_sender(&mut conn, &updated).await.unwrap();

        assert!(!created);
        assert_eq!(user.telegram_chat_id, 200);
        assert_eq!(user.username, "newname");
    }

    #[tokio::test]
    async fn test_credential_roundtrip() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        repo::track_sender(&mut conn, &profile(42, 100)).await.unwrap();

        assert!(repo::get_credential(&mut conn, 42).await.unwrap().is_none());

        repo::save_credential(&mut conn, 42, r#"{"access_token":"secret-token"}"#)
            .await
            .unwrap();

        let auth = repo::get_credential(&mut conn, 42).await.unwrap().unwrap();
        assert_eq!(auth.provider, "notion");
        assert_eq!(auth.access_token(), Some("secret-token".to_string()));
        assert!(!auth.has_database());

        repo::save_database(&mut conn, 42, r#"{"id":"db-1","properties":{}}"#)
            .await
            .unwrap();

        let auth = repo::get_credential(&mut conn, 42).await.unwrap().unwrap();
        assert!(auth.has_database());
        assert_eq!(
            auth.database().unwrap()["id"],
            serde_json::json!("db-1")
        );
    }

    #[tokio::test]
    async fn test_saving_credential_again_keeps_one_row_and_clears_database() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        repo::track_sender(&mut conn, &profile(42, 100)).await.unwrap();

        repo::save_credential(&mut conn, 42, r#"{"access_token":"first"}"#)
            .await
            .unwrap();
        repo::save_database(&mut conn, 42, r#"{"id":"db-1"}"#)
            .await
            .unwrap();

        // Re-authorizing replaces the token and drops the selection.
        repo::save_credential(&mut conn, 42, r#"{"access_token":"second"}"#)
            .await
            .unwrap();

        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM notion_auth WHERE telegram_user_id = 42")
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(count.0, 1);

        let auth = repo::get_credential(&mut conn, 42).await.unwrap().unwrap();
        assert_eq!(auth.access_token(), Some("second".to_string()));
        assert!(!auth.has_database());
    }

    #[tokio::test]
    async fn test_delete_credential() {
        let pool = setup_test_db().await;
        let mut conn = pool.acquire().await.unwrap();

        repo::track_sender(&mut conn, &profile(42, 100)).await.unwrap();
        repo::save_credential(&mut conn, 42, r#"{"access_token":"secret"}"#)
            .await
            .unwrap();

        repo::delete_credential(&mut conn, 42).await.unwrap();

        assert!(repo::get_credential(&mut conn, 42).await.unwrap().is_none());
    }
}
