use std::collections::{BTreeSet, HashMap};

use sqlx::{FromRow, PgConnection, PgExecutor};

use crate::error::AppError;
use crate::models::Tag;

/// All tags of a user, in insertion order.
pub async fn list_tags<'e, E>(executor: E, user_id: i32) -> Result<Vec<Tag>, AppError>
where
    E: PgExecutor<'e>,
{
    let tags = sqlx::query_as::<_, Tag>(
        "SELECT id, name, user_id FROM tags WHERE user_id = $1 ORDER BY id",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(tags)
}

/// Finds the user's tag called `name`, creating it if needed.
///
/// The `(user_id, name)` unique constraint arbitrates concurrent calls: the
/// loser of an insert race waits for the winner and gets its row back.
pub async fn upsert_tag<'e, E>(executor: E, user_id: i32, name: &str) -> Result<Tag, AppError>
where
    E: PgExecutor<'e>,
{
    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (name, user_id) VALUES ($1, $2)
         ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
         RETURNING id, name, user_id",
    )
    .bind(name)
    .bind(user_id)
    .fetch_one(executor)
    .await?;

    Ok(tag)
}

/// Upserts every distinct name and returns the tags ordered by id.
///
/// Names are upserted in sorted order so concurrent transactions lock tag
/// rows in the same sequence.
pub async fn resolve_tags(
    conn: &mut PgConnection,
    user_id: i32,
    names: &[String],
) -> Result<Vec<Tag>, AppError> {
    let unique: BTreeSet<&str> = names.iter().map(String::as_str).collect();

    let mut tags = Vec::with_capacity(unique.len());
    for name in unique {
        tags.push(upsert_tag(&mut *conn, user_id, name).await?);
    }
    tags.sort_by_key(|tag| tag.id);

    Ok(tags)
}

/// Associates `tags` with a todo. Existing associations are kept.
pub async fn link_tags(conn: &mut PgConnection, todo_id: i32, tags: &[Tag]) -> Result<(), AppError> {
    if tags.is_empty() {
        return Ok(());
    }

    let tag_ids: Vec<i32> = tags.iter().map(|tag| tag.id).collect();
    sqlx::query(
        "INSERT INTO todo_tags (todo_id, tag_id)
         SELECT $1, tag_id FROM UNNEST($2::int[]) AS tag_id
         ON CONFLICT DO NOTHING",
    )
    .bind(todo_id)
    .bind(&tag_ids)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn unlink_all_tags(conn: &mut PgConnection, todo_id: i32) -> Result<(), AppError> {
    sqlx::query("DELETE FROM todo_tags WHERE todo_id = $1")
        .bind(todo_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[derive(FromRow)]
struct TodoTagRow {
    todo_id: i32,
    id: i32,
    name: String,
    user_id: i32,
}

/// Tags of the given todos, grouped by todo id and ordered by tag id.
pub async fn tags_for_todos(
    conn: &mut PgConnection,
    user_id: i32,
    todo_ids: &[i32],
) -> Result<HashMap<i32, Vec<Tag>>, AppError> {
    let mut grouped: HashMap<i32, Vec<Tag>> = HashMap::new();
    if todo_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = sqlx::query_as::<_, TodoTagRow>(
        "SELECT tt.todo_id, t.id, t.name, t.user_id
         FROM todo_tags tt
         JOIN tags t ON t.id = tt.tag_id
         WHERE tt.todo_id = ANY($1) AND t.user_id = $2
         ORDER BY tt.todo_id, t.id",
    )
    .bind(todo_ids)
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    for row in rows {
        grouped.entry(row.todo_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
            user_id: row.user_id,
        });
    }

    Ok(grouped)
}
