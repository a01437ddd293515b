use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

/// Health check endpoint
///
/// Reports whether the database answers, plus the current timestamp.
/// Responds `503` when the database is unreachable.
#[get("/health")]
pub async fn health(pool: web::Data<PgPool>) -> impl Responder {
    let database_ok = sqlx::query("SELECT 1").execute(&**pool).await.is_ok();

    let body = json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "database": if database_ok { "up" } else { "down" },
        "timestamp": Utc::now()
    });

    if database_ok {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
