//! Notion API bindings
//!
//! Covers the OAuth token exchange plus the database and page calls used by
//! the relay: listing visible databases, fetching one database's schema, and
//! creating pages.

use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

/// API version pinned for every Notion call.
const NOTION_VERSION: &str = "2021-05-11";

const NOTION_BASE_URL: &str = "https://api.notion.com";

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Notion API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Malformed Notion response: {0}")]
    MalformedResponse(String),
}

pub struct NotionService {
    client: Client,
    client_id: String,
    client_secret: String,
}

impl NotionService {
    pub fn new(client: Client, client_id: String, client_secret: String) -> Self {
        Self {
            client,
            client_id,
            client_secret,
        }
    }

    /// Build the authorization URL a user is redirected to. `state` carries
    /// the Telegram user id across the OAuth round trip.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}/v1/oauth/authorize?client_id={}&redirect_uri={}&response_type=code&owner=user&state={}",
            NOTION_BASE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a token. Returns the raw token
    /// object so the whole credential blob can be persisted as-is.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<Value, NotionError> {
        debug!("Exchanging Notion authorization code for token");

        let response = self
            .client
            .post(format!("{}/v1/oauth/token", NOTION_BASE_URL))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .json(&json!({
                "grant_type": "authorization_code",
                "code": code,
                "redirect_uri": redirect_uri,
            }))
            .send()
            .await
            .map_err(|e| NotionError::RequestFailed(e.to_string()))?;

        let token = Self::parse_response(response).await?;

        if token.get("access_token").and_then(Value::as_str).is_none() {
            return Err(NotionError::MalformedResponse(
                "token response missing access_token".to_string(),
            ));
        }

        Ok(token)
    }

    /// List every database the integration was granted access to.
    pub async fn list_databases(&self, access_token: &str) -> Result<Vec<Value>, NotionError> {
        let response = self
            .client
            .get(format!("{}/v1/databases", NOTION_BASE_URL))
            .bearer_auth(access_token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| NotionError::RequestFailed(e.to_string()))?;

        let body = Self::parse_response(response).await?;

        match body.get("results").and_then(Value::as_array) {
            Some(results) => Ok(results.clone()),
            None => Err(NotionError::MalformedResponse(
                "database list missing results".to_string(),
            )),
        }
    }

    /// Fetch a single database, including its schema/properties.
    pub async fn get_database(
        &self,
        access_token: &str,
        database_id: &str,
    ) -> Result<Value, NotionError> {
        let response = self
            .client
            .get(format!("{}/v1/databases/{}", NOTION_BASE_URL, database_id))
            .bearer_auth(access_token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| NotionError::RequestFailed(e.to_string()))?;

        Self::parse_response(response).await
    }

    /// Create a page. The caller supplies the full payload (parent +
    /// properties) so relay logic stays out of the API binding.
    pub async fn create_page(
        &self,
        access_token: &str,
        payload: &Value,
    ) -> Result<(), NotionError> {
        let response = self
            .client
            .post(format!("{}/v1/pages", NOTION_BASE_URL))
            .bearer_auth(access_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotionError::RequestFailed(e.to_string()))?;

        Self::parse_response(response).await.map(|_| ())
    }

    async fn parse_response(response: reqwest::Response) -> Result<Value, NotionError> {
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, body = %body, "Notion API call failed");
            return Err(NotionError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NotionError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> NotionService {
        NotionService::new(
            Client::new(),
            "client-id".to_string(),
            "client-secret".to_string(),
        )
    }

    #[test]
    fn test_authorization_url_carries_state_and_redirect() {
        let url = service().authorization_url("https://clip.example.com/notion/callback", "tok123");

        assert!(url.starts_with("https://api.notion.com/v1/oauth/authorize?"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("state=tok123"));
        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Fclip.example.com%2Fnotion%2Fcallback"
        ));
        assert!(url.contains("owner=user"));
    }
}
