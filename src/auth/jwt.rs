//! JWT Token Service
//!
//! Handles JWT creation, validation, and claims management for user authentication.

use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const ISSUER: &str = "vtechsoft-api";

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User identifier
    pub id: String,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issuer
    pub iss: String,
}

/// A freshly signed token and its expiry (unix seconds)
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtService {
    /// Create a new JWT service with the provided secret.
    ///
    /// A blank secret is rejected outright instead of signing with an empty key.
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self> {
        ensure!(!secret.trim().is_empty(), "JWT secret must not be empty");
        ensure!(lifetime > Duration::zero(), "JWT lifetime must be positive");

        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            lifetime,
        })
    }

    /// Generate a JWT token for a user
    pub fn create_token(&self, user_id: &str) -> Result<IssuedToken> {
        self.create_token_at(user_id, Utc::now())
    }

    fn create_token_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<IssuedToken> {
        let expiration = now + self.lifetime;

        let claims = Claims {
            id: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: ISSUER.to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")?;
        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .context("Failed to validate JWT token")
    }

    /// Check signature, issuer and expiry, returning the embedded user id
    pub fn verify(&self, token: &str) -> Result<String> {
        self.verify_at(token, Utc::now())
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = self.validate_token(token)?.claims;
        // A token is only valid strictly before its expiry second
        ensure!(claims.exp > now.timestamp(), "JWT token has expired");
        Ok(claims.id)
    }
}
