use sqlx::PgPool;

use super::token::{Claims, TokenSigner};
use crate::error::AppError;
use crate::models::User;
use crate::repository::users;

fn unauthenticated() -> AppError {
    AppError::Unauthorized("Could not validate credentials".into())
}

/// Loads the user named by already-verified claims.
///
/// A token whose signature is still valid but whose user has since been
/// deleted or deactivated is rejected here.
pub async fn user_for_claims(pool: &PgPool, claims: &Claims) -> Result<User, AppError> {
    users::find_by_id(pool, claims.user_id()?)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(unauthenticated)
}

/// Maps a bearer token to the user it was issued for.
pub async fn resolve_identity(
    pool: &PgPool,
    signer: &TokenSigner,
    access_token: &str,
) -> Result<User, AppError> {
    let claims = signer.validate_access_token(access_token)?;
    user_for_claims(pool, &claims).await
}
