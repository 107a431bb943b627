//! Tests for the bot module
//!
//! Command decode, message routing, and relay payload construction are all
//! pure logic, exercised here without any network or database.

#[cfg(test)]
mod tests {
    use crate::bot::commands::{route_message, Command, Route};
    use crate::bot::dispatcher::{classify_databases, database_title, DatabasePick};
    use crate::bot::models::{Chat, IncomingMessage, MessageEntity, Sender};
    use crate::bot::relay::{build_page_payload, title_property, RelayError};
    use serde_json::json;

    fn message(text: &str, entities: Vec<MessageEntity>) -> IncomingMessage {
        IncomingMessage {
            message_id: Some(2),
            chat: Chat { id: 100 },
            from: Some(Sender {
                id: 42,
                is_bot: false,
                first_name: Some("Matt".to_string()),
                last_name: Some("Wilson".to_string()),
                username: Some("ironslob".to_string()),
                language_code: Some("en".to_string()),
            }),
            text: Some(text.to_string()),
            entities,
        }
    }

    fn bot_command(offset: usize, length: usize) -> MessageEntity {
        MessageEntity {
            kind: "bot_command".to_string(),
            offset,
            length,
        }
    }

    #[test]
    fn test_command_parse_known_table() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/stop"), Some(Command::Stop));
        assert_eq!(Command::parse("/about"), Some(Command::About));
        assert_eq!(Command::parse("/database"), Some(Command::Database));
        assert_eq!(Command::parse("/reauth"), Some(Command::Reauth));
        assert_eq!(Command::parse("/frobnicate"), None);
    }

    #[test]
    fn test_only_database_requires_auth() {
        assert!(Command::Database.requires_auth());
        assert!(!Command::Start.requires_auth());
        assert!(!Command::Reauth.requires_auth());
    }

    #[test]
    fn test_command_text_extraction() {
        let msg = message("/start", vec![bot_command(0, 6)]);
        assert_eq!(msg.command_text(), Some("/start"));
    }

    #[test]
    fn test_command_text_honors_nonzero_offset() {
        let msg = message("hey /help", vec![bot_command(4, 5)]);
        assert_eq!(msg.command_text(), Some("/help"));
    }

    #[test]
    fn test_command_text_absent_without_entities() {
        let msg = message("Buy milk", vec![]);
        assert_eq!(msg.command_text(), None);
    }

    #[test]
    fn test_command_text_ignores_non_command_entities() {
        let msg = message(
            "https://example.com",
            vec![MessageEntity {
                kind: "url".to_string(),
                offset: 0,
                length: 19,
            }],
        );
        assert_eq!(msg.command_text(), None);
    }

    #[test]
    fn test_unauthenticated_plain_message_prompts_auth_never_relays() {
        assert_eq!(route_message(None, false, false), Route::PromptAuth);
    }

    #[test]
    fn test_credential_without_database_chooses_database_never_relays() {
        assert_eq!(route_message(None, true, false), Route::ChooseDatabase);
    }

    #[test]
    fn test_fully_configured_plain_message_relays() {
        assert_eq!(route_message(None, true, true), Route::Relay);
    }

    #[test]
    fn test_unknown_command_is_echoed() {
        assert_eq!(
            route_message(Some("/frobnicate"), true, true),
            Route::UnknownCommand("/frobnicate")
        );
    }

    #[test]
    fn test_auth_requiring_command_rejected_without_credential() {
        assert_eq!(
            route_message(Some("/database"), false, false),
            Route::CommandNeedsAuth(Command::Database)
        );
        assert_eq!(
            route_message(Some("/database"), true, false),
            Route::Command(Command::Database)
        );
    }

    #[test]
    fn test_commands_route_regardless_of_database_selection() {
        assert_eq!(
            route_message(Some("/help"), false, false),
            Route::Command(Command::Help)
        );
        assert_eq!(
            route_message(Some("/reauth"), true, true),
            Route::Command(Command::Reauth)
        );
    }

    #[test]
    fn test_title_property_lookup() {
        let database = json!({
            "id": "db-1",
            "properties": {
                "Tags": { "type": "multi_select" },
                "Name": { "type": "title" },
            }
        });

        assert_eq!(title_property(&database), Some("Name"));
    }

    #[test]
    fn test_page_payload_embeds_text_in_title_property() {
        let database = json!({
            "id": "db-1",
            "properties": {
                "Name": { "type": "title" },
            }
        });

        let payload = build_page_payload(&database, "Buy milk").unwrap();

        assert_eq!(payload["parent"]["type"], json!("database_id"));
        assert_eq!(payload["parent"]["database_id"], json!("db-1"));
        assert_eq!(
            payload["properties"]["Name"]["title"][0]["text"]["content"],
            json!("Buy milk")
        );
    }

    #[test]
    fn test_page_payload_fails_without_title_property() {
        let database = json!({
            "id": "db-1",
            "properties": {
                "Tags": { "type": "multi_select" },
            }
        });

        assert_eq!(
            build_page_payload(&database, "Buy milk"),
            Err(RelayError::MissingTitleProperty)
        );
    }

    #[test]
    fn test_zero_databases_classified_as_no_access() {
        assert_eq!(classify_databases(&[]), DatabasePick::NoneVisible);
    }

    #[test]
    fn test_single_database_is_auto_selected() {
        let databases = vec![json!({ "id": "db-1" })];

        match classify_databases(&databases) {
            DatabasePick::Single(db) => assert_eq!(db["id"], json!("db-1")),
            other => panic!("expected Single, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_databases_are_refused() {
        let databases = vec![json!({ "id": "db-1" }), json!({ "id": "db-2" })];

        assert_eq!(classify_databases(&databases), DatabasePick::Unsupported(2));
    }

    #[test]
    fn test_database_title_reads_plain_text() {
        let database = json!({
            "title": [ { "plain_text": "Inbox" } ]
        });

        assert_eq!(database_title(&database), "Inbox");
        assert_eq!(database_title(&json!({})), "Untitled");
    }
}
