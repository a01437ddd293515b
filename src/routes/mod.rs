pub mod auth;
pub mod categories;
pub mod export;
pub mod health;
pub mod tags;
pub mod todos;

use actix_web::{web, Error};

use crate::error::AppError;

fn unprocessable(message: String) -> Error {
    AppError::ValidationError(message).into()
}

/// Registers every `/api` route. `AuthMiddleware` is applied by the caller.
///
/// Bodies, query strings and path segments that fail to deserialize are
/// reported like failed validation: 422 with an `{"error": ..}` body.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| unprocessable(err.to_string())))
        .app_data(web::FormConfig::default().error_handler(|err, _| unprocessable(err.to_string())))
        .app_data(web::QueryConfig::default().error_handler(|err, _| unprocessable(err.to_string())))
        .app_data(web::PathConfig::default().error_handler(|err, _| unprocessable(err.to_string())));

    cfg.service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login)
            .service(auth::refresh)
            .service(auth::me),
    )
    .service(
        web::scope("/todos")
            .service(todos::list_todos)
            .service(todos::create_todo)
            .service(todos::get_todo)
            .service(todos::update_todo)
            .service(todos::delete_todo),
    )
    .service(
        web::scope("/categories")
            .service(categories::list_categories)
            .service(categories::create_category)
            .service(categories::update_category)
            .service(categories::delete_category),
    )
    .service(
        web::scope("/tags")
            .service(tags::list_tags)
            .service(tags::create_tag),
    )
    .service(web::scope("/anki-export").service(export::export_todos));
}
