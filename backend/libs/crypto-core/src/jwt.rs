//! Session token issuing and validation
//!
//! Tokens are HS256 JWTs whose subject is the account id. Keys live in a
//! `JwtKeys` value built once at startup and handed to whoever needs it
//! (the auth handlers and the authentication middleware), so there is no
//! process-wide key registry.
//!
//! ```rust
//! use crypto_core::jwt::JwtKeys;
//! use uuid::Uuid;
//!
//! let keys = JwtKeys::from_secret("local-dev-secret", 30);
//! let token = keys.issue(Uuid::new_v4()).unwrap();
//! assert!(keys.validate(&token).is_ok());
//! ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims carried by session tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signing and verification keys plus token lifetime
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_days: i64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("secret", &"[REDACTED]")
            .field("expiry_days", &self.expiry_days)
            .finish()
    }
}

impl JwtKeys {
    /// Build keys from a shared secret
    pub fn from_secret(secret: &str, expiry_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_days,
        }
    }

    pub fn expiry_days(&self) -> i64 {
        self.expiry_days
    }

    /// Issue a session token for an account
    pub fn issue(&self, account_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::days(self.expiry_days);

        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| anyhow!("Failed to generate session token: {e}"))
    }

    /// Validate and decode a token (without the "Bearer " prefix)
    ///
    /// Fails on a bad signature, an expired token or a malformed payload.
    pub fn validate(&self, token: &str) -> Result<TokenData<Claims>> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))
    }

    /// Validate a token and return the account id in its subject
    pub fn account_id(&self, token: &str) -> Result<Uuid> {
        let token_data = self.validate(token)?;
        Uuid::parse_str(&token_data.claims.sub)
            .map_err(|e| anyhow!("Invalid account ID format in token: {e}"))
    }
}
