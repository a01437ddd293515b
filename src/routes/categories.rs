use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{CategoryInput, CategoryUpdate, DeleteCategoryQuery},
    repository::categories,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Category not found".into())
}

#[get("")]
pub async fn list_categories(
    pool: web::Data<PgPool>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let categories = categories::list_categories(&**pool, current_user.id()).await?;
    Ok(HttpResponse::Ok().json(categories))
}

/// Returns the user's category with this name, creating it if needed.
/// The color only applies to a newly created category.
#[post("")]
pub async fn create_category(
    pool: web::Data<PgPool>,
    category_data: web::Json<CategoryInput>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    category_data.validate()?;

    let category = categories::upsert_category(
        &**pool,
        current_user.id(),
        &category_data.name,
        category_data.color.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(category))
}

#[put("/{id}")]
pub async fn update_category(
    pool: web::Data<PgPool>,
    category_id: web::Path<i32>,
    category_data: web::Json<CategoryUpdate>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    category_data.validate()?;

    let category = categories::update_category(
        &**pool,
        current_user.id(),
        category_id.into_inner(),
        &category_data,
    )
    .await?
    .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(category))
}

/// Deletes a category and returns it.
///
/// ## Query Parameters:
/// - `new_category_id` (optional): category that takes over the deleted
///   category's todos. Without it those todos lose their category.
#[delete("/{id}")]
pub async fn delete_category(
    pool: web::Data<PgPool>,
    category_id: web::Path<i32>,
    query: web::Query<DeleteCategoryQuery>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let category = categories::delete_category(
        &pool,
        current_user.id(),
        category_id.into_inner(),
        query.new_category_id,
    )
    .await?
    .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(category))
}
