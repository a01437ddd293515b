use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{TodoInput, TodoQuery, TodoUpdate},
    repository::todos,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Todo not found".into())
}

/// Lists the authenticated user's todos, oldest first.
///
/// ## Query Parameters:
/// - `skip` (optional, default 0): number of todos to skip.
/// - `limit` (optional, default 100, max 1000): page size.
#[get("")]
pub async fn list_todos(
    pool: web::Data<PgPool>,
    query: web::Query<TodoQuery>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let todos = todos::list_todos(&pool, current_user.id(), query.skip, query.limit).await?;

    Ok(HttpResponse::Ok().json(todos))
}

/// Creates a todo.
///
/// `category` and `tags` are names; names the user does not have yet are
/// created as new categories and tags.
#[post("")]
pub async fn create_todo(
    pool: web::Data<PgPool>,
    todo_data: web::Json<TodoInput>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = todos::create_todo(&pool, current_user.id(), todo_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(todo))
}

#[get("/{id}")]
pub async fn get_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<i32>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todo = todos::get_todo(&pool, current_user.id(), todo_id.into_inner())
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Partially updates a todo. Fields missing from the body are left as they are.
///
/// ## Responses:
/// - `200 OK`: the updated todo.
/// - `404 Not Found`: the todo does not exist or belongs to another user.
/// - `422 Unprocessable Entity`: validation failed.
#[put("/{id}")]
pub async fn update_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<i32>,
    todo_data: web::Json<TodoUpdate>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    let todo = todos::update_todo(
        &pool,
        current_user.id(),
        todo_id.into_inner(),
        todo_data.into_inner(),
    )
    .await?
    .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}

/// Deletes a todo and returns it.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<i32>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todo = todos::delete_todo(&pool, current_user.id(), todo_id.into_inner())
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(todo))
}
