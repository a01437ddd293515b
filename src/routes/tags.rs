use crate::{auth::CurrentUser, error::AppError, models::TagInput, repository::tags};
use actix_web::{get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

#[get("")]
pub async fn list_tags(
    pool: web::Data<PgPool>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tags = tags::list_tags(&**pool, current_user.id()).await?;
    Ok(HttpResponse::Ok().json(tags))
}

/// Returns the user's tag with this name, creating it if needed.
#[post("")]
pub async fn create_tag(
    pool: web::Data<PgPool>,
    tag_data: web::Json<TagInput>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    tag_data.validate()?;

    let tag = tags::upsert_tag(&**pool, current_user.id(), &tag_data.name).await?;
    Ok(HttpResponse::Ok().json(tag))
}
