use crate::{
    auth::CurrentUser,
    error::AppError,
    export::{export_filename, render_tsv, EXPORT_CONTENT_TYPE, EXPORT_LIMIT},
    repository::todos,
};
use actix_web::{get, http::header, web, HttpResponse, Responder};
use chrono::Utc;
use sqlx::PgPool;

/// Downloads the user's todos as a TSV file named after today's date.
#[get("")]
pub async fn export_todos(
    pool: web::Data<PgPool>,
    current_user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todos = todos::list_todos(&pool, current_user.id(), 0, EXPORT_LIMIT).await?;
    let filename = export_filename(Utc::now().date_naive());

    Ok(HttpResponse::Ok()
        .content_type(EXPORT_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(render_tsv(&todos)))
}
