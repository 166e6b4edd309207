//! # JWT Token Management
//!
//! Bearer-token issuance and verification (HS256).
//!
//! A token binds an identity (the user's email, in `sub`) to the role names
//! held at issuance. Role claims are informational only: permission checks
//! are resolved against the live store on every request.

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lib_utils::now_utc;
use serde::{Deserialize, Serialize};

/// JWT Claims structure containing user authentication information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Role names held when the token was issued
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Token errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to encode JWT: {0}")]
    Encode(String),
    #[error("Failed to decode JWT: {0}")]
    Decode(String),
}

/// Encode a JWT token with user claims.
pub fn encode_jwt(
    email: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_hours: i64,
) -> Result<String, Error> {
    let now = now_utc();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: email.to_string(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Encode(e.to_string()))
}

/// Decode and validate a JWT token (signature and expiry).
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| Error::Decode(e.to_string()))?;

    Ok(token_data.claims)
}

/// Issuer/verifier pair bound to one secret and lifetime.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    expiration_hours: i64,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }

    /// Issue a token for a verified identity.
    pub fn issue(&self, email: &str, roles: Vec<String>) -> Result<String, Error> {
        encode_jwt(email, roles, &self.secret, self.expiration_hours)
    }

    /// Verify a bearer token and extract its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        decode_jwt(token, &self.secret)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"***")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-must-be-at-least-32-chars-long!";

    #[test]
    fn test_jwt_encoding_decoding() {
        let roles = vec!["User".to_string()];

        let token = encode_jwt("alice@example.com", roles.clone(), SECRET, 24)
            .expect("JWT encoding should succeed");
        let claims = decode_jwt(&token, SECRET).expect("JWT decoding should succeed");

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.roles, roles);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = encode_jwt("alice@example.com", vec![], SECRET, 24).expect("encode");

        assert!(decode_jwt(&token, "another-secret-that-is-also-32-chars!!").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issued already two hours past expiry, well beyond the default leeway.
        let token = encode_jwt("alice@example.com", vec![], SECRET, -2).expect("encode");

        assert!(matches!(decode_jwt(&token, SECRET), Err(Error::Decode(_))));
    }

    #[test]
    fn test_codec_round_trip_and_debug_hides_secret() {
        let codec = TokenCodec::new(SECRET, 1);
        let token = codec.issue("bob@example.com", vec!["Admin".into()]).expect("issue");

        assert_eq!(codec.verify(&token).expect("verify").sub, "bob@example.com");
        assert!(!format!("{codec:?}").contains(SECRET));
    }
}
