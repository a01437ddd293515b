use std::collections::HashMap;

use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::error::AppError;
use crate::models::{Category, CategoryUpdate, DEFAULT_CATEGORY_COLOR};

/// All categories of a user, in insertion order.
pub async fn list_categories<'e, E>(executor: E, user_id: i32) -> Result<Vec<Category>, AppError>
where
    E: PgExecutor<'e>,
{
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, color, user_id FROM categories WHERE user_id = $1 ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(categories)
}

/// Finds the user's category called `name`, creating it with `color` (or
/// white) if needed. An existing category keeps its color.
pub async fn upsert_category<'e, E>(
    executor: E,
    user_id: i32,
    name: &str,
    color: Option<&str>,
) -> Result<Category, AppError>
where
    E: PgExecutor<'e>,
{
    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, color, user_id) VALUES ($1, $2, $3)
         ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id, name, color, user_id",
    )
    .bind(name)
    .bind(color.unwrap_or(DEFAULT_CATEGORY_COLOR))
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(category)
}

/// Applies the present fields of `update`. Renaming onto a name the user
/// already has is a `Conflict`.
pub async fn update_category<'e, E>(
    executor: E,
    user_id: i32,
    category_id: i32,
    update: &CategoryUpdate,
) -> Result<Option<Category>, AppError>
where
    E: PgExecutor<'e>,
{
    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories
         SET name = COALESCE($1, name), color = COALESCE($2, color)
         WHERE id = $3 AND user_id = $4
         RETURNING id, name, color, user_id",
    )
    .bind(update.name.as_deref())
    .bind(update.color.as_deref())
    .bind(category_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(category)
}

/// Deletes a category. Its todos move to `replacement_id` when given,
/// otherwise they are left without a category.
///
/// The replacement must be another category of the same user; anything else
/// is rejected before any row changes.
pub async fn delete_category(
    pool: &PgPool,
    user_id: i32,
    category_id: i32,
    replacement_id: Option<i32>,
) -> Result<Option<Category>, AppError> {
    let mut tx = pool.begin().await?;

    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, color, user_id FROM categories
         WHERE id = $1 AND user_id = $2
         FOR UPDATE",
    )
    .bind(category_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(category) = category else {
        tx.rollback().await?;
        return Ok(None);
    };

    if let Some(replacement_id) = replacement_id {
        if replacement_id == category_id {
            return Err(AppError::BadRequest(
                "A category cannot replace itself".into(),
            ));
        }

        let replacement = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM categories WHERE id = $1 AND user_id = $2 FOR SHARE",
        )
        .bind(replacement_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if replacement.is_none() {
            return Err(AppError::NotFound("Replacement category not found".into()));
        }
    }

    sqlx::query(
        "UPDATE todos SET category_id = $1, updated_at = NOW()
         WHERE category_id = $2 AND user_id = $3",
    )
    .bind(replacement_id)
    .bind(category_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
        .bind(category_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(category))
}

/// Categories the user owns among `category_ids`, keyed by id.
pub async fn categories_by_id(
    conn: &mut PgConnection,
    user_id: i32,
    category_ids: &[i32],
) -> Result<HashMap<i32, Category>, AppError> {
    if category_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, color, user_id FROM categories
         WHERE user_id = $1 AND id = ANY($2)",
    )
    .bind(user_id)
    .bind(category_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(categories
        .into_iter()
        .map(|category| (category.id, category))
        .collect())
}
