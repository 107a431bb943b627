//! OAuth state token
//!
//! The Telegram user id has to survive the round trip through Notion's
//! authorize page. It rides in the OAuth `state` parameter as a short-lived
//! signed token, so the callback can recover it without any server-side
//! session.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const STATE_TOKEN_TTL_MINUTES: i64 = 15;

/// Claims carried by the state token
#[derive(Serialize, Deserialize, Debug)]
pub struct StateClaims {
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum StateTokenError {
    #[error("invalid state token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("state token subject is not a user id")]
    BadSubject,
}

pub fn issue_state_token(
    secret: &str,
    telegram_user_id: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = StateClaims {
        sub: telegram_user_id.to_string(),
        exp: (Utc::now() + Duration::minutes(STATE_TOKEN_TTL_MINUTES)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_state_token(secret: &str, token: &str) -> Result<i64, StateTokenError> {
    let data = decode::<StateClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    data.claims
        .sub
        .parse::<i64>()
        .map_err(|_| StateTokenError::BadSubject)
}
