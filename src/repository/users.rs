use sqlx::PgExecutor;

use crate::error::AppError;
use crate::models::User;

/// Inserts a user. A duplicate email is reported as `AppError::Conflict`.
pub async fn create_user<'e, E>(executor: E, email: &str, password_hash: &str) -> Result<User, AppError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2)
         RETURNING id, email, password_hash, is_active, created_at",
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(executor)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict(format!("Email {} is already registered", email)),
        other => other,
    })
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, AppError>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, is_active, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn find_by_id<'e, E>(executor: E, user_id: i32) -> Result<Option<User>, AppError>
where
    E: PgExecutor<'e>,
{
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, is_active, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

/// Deletes a user; todos, categories, tags, and refresh tokens go with it.
pub async fn delete_user<'e, E>(executor: E, user_id: i32) -> Result<bool, AppError>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
