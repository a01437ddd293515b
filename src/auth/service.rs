use chrono::Duration;
use sqlx::PgPool;

use super::password::{hash_password_with_cost, verify_password};
use super::refresh::{
    issue_refresh_token, purge_expired_refresh_tokens, redeem_refresh_token,
};
use super::token::TokenSigner;
use super::TokenPair;
use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::repository::users;

/// Registration, login, and token refresh.
///
/// Holds the access-token signer plus the refresh-token lifetime and bcrypt
/// cost. Shared between workers through `web::Data`.
#[derive(Clone)]
pub struct AuthService {
    signer: TokenSigner,
    refresh_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(signer: TokenSigner, refresh_ttl: Duration, bcrypt_cost: u32) -> Self {
        Self {
            signer,
            refresh_ttl,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TokenSigner::new(
                &config.auth_secret_key,
                Duration::minutes(config.access_token_ttl_minutes),
            ),
            Duration::days(config.refresh_token_ttl_days),
            config.bcrypt_cost,
        )
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Creates an account. A taken email is an `AppError::Conflict`.
    pub async fn register(&self, pool: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
        if users::find_by_email(pool, email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Email {} is already registered",
                email
            )));
        }

        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        let password_hash = run_blocking(move || hash_password_with_cost(&password, cost)).await?;

        // A concurrent registration can still win the race; the unique
        // index turns that into a Conflict as well.
        let user = users::create_user(pool, email, &password_hash).await?;
        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Checks credentials and issues a token pair.
    ///
    /// Unknown emails, wrong passwords, and deactivated accounts all produce
    /// the same `Unauthorized` error.
    pub async fn login(&self, pool: &PgPool, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let invalid = || AppError::Unauthorized("Invalid credentials".into());

        let user = users::find_by_email(pool, email).await?;
        let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
        let matches = self.password_matches(password, stored_hash).await?;

        let user = match user {
            Some(user) if matches && user.is_active => user,
            Some(user) => {
                log::warn!("Rejected login for user {}", user.id);
                return Err(invalid());
            }
            None => {
                log::warn!("Login attempt for unknown email");
                return Err(invalid());
            }
        };

        let mut tx = pool.begin().await?;
        let purged = purge_expired_refresh_tokens(&mut tx, user.id).await?;
        let refresh_token = issue_refresh_token(&mut tx, user.id, self.refresh_ttl).await?;
        tx.commit().await?;

        if purged > 0 {
            log::debug!("Purged {} expired refresh tokens for user {}", purged, user.id);
        }
        log::info!("User {} logged in", user.id);

        Ok(TokenPair::bearer(
            self.signer.issue_access_token(user.id)?,
            refresh_token,
        ))
    }

    /// Rotates a refresh token and returns a new pair.
    /// The presented token is unusable afterwards.
    pub async fn refresh(&self, pool: &PgPool, refresh_token: &str) -> Result<TokenPair, AppError> {
        let (user_id, replacement) = redeem_refresh_token(pool, refresh_token, self.refresh_ttl).await?;
        log::info!("Rotated refresh token for user {}", user_id);

        Ok(TokenPair::bearer(
            self.signer.issue_access_token(user_id)?,
            replacement,
        ))
    }

    /// Checks `password` against `stored_hash`. Without a stored hash the
    /// password is hashed anyway and the check fails, so an unknown email
    /// costs the same bcrypt work as a wrong password.
    async fn password_matches(
        &self,
        password: &str,
        stored_hash: Option<String>,
    ) -> Result<bool, AppError> {
        let password = password.to_owned();
        match stored_hash {
            Some(hash) => run_blocking(move || verify_password(&password, &hash)).await,
            None => {
                let cost = self.bcrypt_cost;
                run_blocking(move || hash_password_with_cost(&password, cost)).await?;
                Ok(false)
            }
        }
    }
}

/// Runs CPU-bound bcrypt work off the async executor.
async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Blocking task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    fn service(bcrypt_cost: u32) -> AuthService {
        AuthService::new(
            TokenSigner::with_default_ttl("service_test_secret"),
            Duration::days(1),
            bcrypt_cost,
        )
    }

    #[actix_rt::test]
    async fn test_password_matches_stored_hash() {
        let auth = service(TEST_COST);
        let hash = hash_password_with_cost("correct horse", TEST_COST).unwrap();

        assert!(auth
            .password_matches("correct horse", Some(hash.clone()))
            .await
            .unwrap());
        assert!(!auth.password_matches("wrong horse", Some(hash)).await.unwrap());
    }

    #[actix_rt::test]
    async fn test_unknown_email_never_matches() {
        assert!(!service(TEST_COST)
            .password_matches("anything", None)
            .await
            .unwrap());
    }

    #[actix_rt::test]
    async fn test_unknown_email_still_hashes() {
        // bcrypt rejects cost 2, so an error shows the hash was attempted.
        let result = service(2).password_matches("anything", None).await;
        assert!(matches!(result, Err(AppError::InternalServerError(_))));
    }
}
