use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Default lifetime of an access token.
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 60;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id in decimal.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
}

impl Claims {
    /// The user id carried in `sub`.
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".into()))
    }
}

/// Signs and verifies HS256 access tokens.
///
/// Access tokens are stateless: verifying one needs only the secret held
/// here, never the database. One signer is built from the configuration at
/// start-up and shared through `web::Data`.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the default 60 second grace would outlive `exp`.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_ttl,
        }
    }

    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES))
    }

    /// Issues an access token for `user_id` with the configured lifetime.
    pub fn issue_access_token(&self, user_id: i32) -> Result<String, AppError> {
        self.issue_access_token_with_ttl(user_id, self.access_ttl)
    }

    /// Issues an access token for `user_id` expiring `ttl` from now.
    pub fn issue_access_token_with_ttl(&self, user_id: i32, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration.timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of an access token and returns its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature
    /// is invalid, it has expired, or its subject claim is missing.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AppError::from)
    }
}
