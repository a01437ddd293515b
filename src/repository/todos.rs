use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use super::{categories, tags};
use crate::error::AppError;
use crate::models::{Todo, TodoInput, TodoRow, TodoUpdate};

const TODO_COLUMNS: &str = "id, title, description, priority, due_date, completed, user_id, \
                            category_id, created_at, updated_at";

/// Attaches categories and tags to raw rows, keeping the rows' order.
async fn assemble(
    conn: &mut PgConnection,
    user_id: i32,
    rows: Vec<TodoRow>,
) -> Result<Vec<Todo>, AppError> {
    let todo_ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
    let mut category_ids: Vec<i32> = rows.iter().filter_map(|row| row.category_id).collect();
    category_ids.sort_unstable();
    category_ids.dedup();

    let categories = categories::categories_by_id(&mut *conn, user_id, &category_ids).await?;
    let mut tags = tags::tags_for_todos(&mut *conn, user_id, &todo_ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let category = row.category_id.and_then(|id| categories.get(&id).cloned());
            let todo_tags = tags.remove(&row.id).unwrap_or_default();
            Todo::from_parts(row, category, todo_tags)
        })
        .collect())
}

async fn fetch_one(
    conn: &mut PgConnection,
    user_id: i32,
    todo_id: i32,
    lock: bool,
) -> Result<Option<Todo>, AppError> {
    let sql = format!(
        "SELECT {} FROM todos WHERE id = $1 AND user_id = $2{}",
        TODO_COLUMNS,
        if lock { " FOR UPDATE" } else { "" }
    );
    let row = sqlx::query_as::<_, TodoRow>(&sql)
        .bind(todo_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(assemble(conn, user_id, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// A page of the user's todos in creation order, with category and tags.
pub async fn list_todos(
    pool: &PgPool,
    user_id: i32,
    offset: i64,
    limit: i64,
) -> Result<Vec<Todo>, AppError> {
    let mut conn = pool.acquire().await?;

    let sql = format!(
        "SELECT {} FROM todos WHERE user_id = $1 ORDER BY id OFFSET $2 LIMIT $3",
        TODO_COLUMNS
    );
    let rows = sqlx::query_as::<_, TodoRow>(&sql)
        .bind(user_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

    assemble(&mut conn, user_id, rows).await
}

pub async fn get_todo(pool: &PgPool, user_id: i32, todo_id: i32) -> Result<Option<Todo>, AppError> {
    let mut conn = pool.acquire().await?;
    fetch_one(&mut conn, user_id, todo_id, false).await
}

/// Creates a todo for `user_id`.
///
/// The category name and every tag name are looked up among the user's rows
/// and created when missing. Upserts, the insert, and the tag links commit
/// together or not at all.
pub async fn create_todo(pool: &PgPool, user_id: i32, input: TodoInput) -> Result<Todo, AppError> {
    let mut tx = pool.begin().await?;

    let category = match input.category.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => Some(categories::upsert_category(&mut *tx, user_id, name, None).await?),
        None => None,
    };
    let todo_tags = tags::resolve_tags(&mut tx, user_id, &input.tags).await?;

    let sql = format!(
        "INSERT INTO todos (title, description, priority, due_date, completed, user_id, category_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {}",
        TODO_COLUMNS
    );
    let row = sqlx::query_as::<_, TodoRow>(&sql)
        .bind(input.title)
        .bind(input.description)
        .bind(input.priority.unwrap_or_default())
        .bind(input.due_date)
        .bind(input.completed.unwrap_or(false))
        .bind(user_id)
        .bind(category.as_ref().map(|category| category.id))
        .fetch_one(&mut *tx)
        .await?;

    tags::link_tags(&mut tx, row.id, &todo_tags).await?;
    tx.commit().await?;

    Ok(Todo::from_parts(row, category, todo_tags))
}

/// Applies the fields present in `patch` to one of the user's todos.
///
/// Returns `Ok(None)` when the todo does not exist or is not the user's; any
/// category created along the way is rolled back in that case.
pub async fn update_todo(
    pool: &PgPool,
    user_id: i32,
    todo_id: i32,
    patch: TodoUpdate,
) -> Result<Option<Todo>, AppError> {
    let mut tx = pool.begin().await?;

    let category_id = match patch.category_change() {
        Some(Some(name)) => Some(Some(
            categories::upsert_category(&mut *tx, user_id, name, None).await?.id,
        )),
        Some(None) => Some(None),
        None => None,
    };

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE todos SET updated_at = NOW()");
    if let Some(title) = patch.title {
        builder.push(", title = ").push_bind(title);
    }
    if let Some(description) = patch.description {
        builder.push(", description = ").push_bind(description);
    }
    if let Some(priority) = patch.priority {
        builder.push(", priority = ").push_bind(priority);
    }
    if let Some(due_date) = patch.due_date {
        builder.push(", due_date = ").push_bind(due_date);
    }
    if let Some(completed) = patch.completed {
        builder.push(", completed = ").push_bind(completed);
    }
    if let Some(category_id) = category_id {
        builder.push(", category_id = ").push_bind(category_id);
    }
    builder
        .push(" WHERE id = ")
        .push_bind(todo_id)
        .push(" AND user_id = ")
        .push_bind(user_id)
        .push(" RETURNING id");

    let updated = builder
        .build_query_scalar::<i32>()
        .fetch_optional(&mut *tx)
        .await?;

    if updated.is_none() {
        tx.rollback().await?;
        return Ok(None);
    }

    if let Some(names) = patch.tags {
        tags::unlink_all_tags(&mut tx, todo_id).await?;
        let todo_tags = tags::resolve_tags(&mut tx, user_id, &names).await?;
        tags::link_tags(&mut tx, todo_id, &todo_tags).await?;
    }

    let todo = fetch_one(&mut tx, user_id, todo_id, false).await?;
    tx.commit().await?;

    Ok(todo)
}

/// Deletes one of the user's todos and returns it as it was.
/// Its tag links go with it; the tags themselves stay.
pub async fn delete_todo(pool: &PgPool, user_id: i32, todo_id: i32) -> Result<Option<Todo>, AppError> {
    let mut tx = pool.begin().await?;

    let Some(todo) = fetch_one(&mut tx, user_id, todo_id, true).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(todo_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(todo))
}
