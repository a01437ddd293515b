//! Refresh tokens: opaque random strings persisted in `refresh_tokens`.
//!
//! A token is single use. Redeeming it deletes the row and issues a
//! replacement for the same user inside one transaction, so a replayed token
//! is rejected and no caller ever observes the old token gone without a new
//! one in place. Expiry is checked when a token is redeemed.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sqlx::{PgConnection, PgPool};

use crate::error::AppError;
use crate::models::RefreshToken;
use crate::repository::users;

pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 180;

/// 32 bytes = 256 bits of entropy, 43 URL-safe characters.
const REFRESH_TOKEN_BYTES: usize = 32;

/// Generates an unguessable URL-safe token from OS entropy.
pub fn generate_refresh_token() -> String {
    let mut buffer = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Persists a fresh refresh token for `user_id` and returns it.
pub async fn issue_refresh_token(
    conn: &mut PgConnection,
    user_id: i32,
    ttl: Duration,
) -> Result<String, AppError> {
    let token = generate_refresh_token();
    let expires_at = Utc::now() + ttl;

    sqlx::query("INSERT INTO refresh_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *conn)
        .await?;

    Ok(token)
}

/// Redeems `token`, returning its owner and a replacement token.
///
/// Fails with `AppError::InvalidToken` when the token is unknown (including
/// already redeemed), expired, or belongs to a deactivated account. Expired
/// and deactivated tokens are removed as part of the rejection.
pub async fn redeem_refresh_token(
    pool: &PgPool,
    token: &str,
    ttl: Duration,
) -> Result<(i32, String), AppError> {
    let mut tx = pool.begin().await?;

    // The row lock taken by DELETE serialises concurrent redemptions: only
    // one of them gets the row back.
    let redeemed = sqlx::query_as::<_, RefreshToken>(
        "DELETE FROM refresh_tokens WHERE token = $1
         RETURNING id, token, user_id, expires_at, created_at",
    )
    .bind(token)
    .fetch_optional(&mut *tx)
    .await?;

    let invalid = || AppError::InvalidToken("Invalid refresh token".into());

    let Some(record) = redeemed else {
        tx.rollback().await?;
        return Err(invalid());
    };

    if record.is_expired() {
        tx.commit().await?;
        log::info!("Rejected expired refresh token for user {}", record.user_id);
        return Err(invalid());
    }

    // A deactivated account loses the token it presented and gets no replacement.
    let active = users::find_by_id(&mut *tx, record.user_id)
        .await?
        .is_some_and(|user| user.is_active);
    if !active {
        tx.commit().await?;
        log::warn!("Rejected refresh token for inactive user {}", record.user_id);
        return Err(invalid());
    }

    let replacement = issue_refresh_token(&mut *tx, record.user_id, ttl).await?;
    tx.commit().await?;

    Ok((record.user_id, replacement))
}

/// Deletes the expired refresh tokens of one user. Returns how many were removed.
pub async fn purge_expired_refresh_tokens(
    conn: &mut PgConnection,
    user_id: i32,
) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1 AND expires_at <= NOW()")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_refresh_tokens_are_unique_and_url_safe() {
        let tokens: HashSet<String> = (0..64).map(|_| generate_refresh_token()).collect();
        assert_eq!(tokens.len(), 64);

        for token in &tokens {
            assert_eq!(token.len(), 43);
            assert!(token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_refresh_token_decodes_to_full_entropy() {
        let decoded = URL_SAFE_NO_PAD.decode(generate_refresh_token()).unwrap();
        assert_eq!(decoded.len(), REFRESH_TOKEN_BYTES);
    }
}
