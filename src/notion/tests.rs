//! Tests for the notion module
//!
//! These tests verify the OAuth state token: round-tripping the user id and
//! rejecting forged or stale tokens.

#[cfg(test)]
mod tests {
    use crate::notion::models::{issue_state_token, verify_state_token, StateClaims};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    const SECRET: &str = "test_secret_key";

    #[test]
    fn test_state_token_roundtrips_user_id() {
        let token = issue_state_token(SECRET, 983713751).expect("Failed to issue token");
        let user_id = verify_state_token(SECRET, &token).expect("Failed to verify token");

        assert_eq!(user_id, 983713751);
    }

    #[test]
    fn test_state_token_rejected_with_wrong_secret() {
        let token = issue_state_token(SECRET, 42).expect("Failed to issue token");

        assert!(verify_state_token("some_other_secret", &token).is_err());
    }

    #[test]
    fn test_expired_state_token_rejected() {
        // Expiry far enough in the past to clear default validation leeway.
        let claims = StateClaims {
            sub: "42".to_string(),
            exp: 1000,
            jti: "nonce".to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token");

        assert!(verify_state_token(SECRET, &token).is_err());
    }

    #[test]
    fn test_state_token_with_non_numeric_subject_rejected() {
        let claims = StateClaims {
            sub: "not-a-user-id".to_string(),
            exp: 9999999999,
            jti: "nonce".to_string(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("Failed to encode token");

        assert!(verify_state_token(SECRET, &token).is_err());
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let a = issue_state_token(SECRET, 42).expect("Failed to issue token");
        let b = issue_state_token(SECRET, 42).expect("Failed to issue token");

        // jti nonce keeps otherwise-identical tokens distinct.
        assert_ne!(a, b);
    }
}
