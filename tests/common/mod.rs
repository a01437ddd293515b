#![allow(dead_code)]

use actix_web::test;
use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use todo_api::auth::{AuthService, TokenPair, TokenSigner};
use todo_api::db;

pub const TEST_SECRET: &str = "integration_test_secret";

/// bcrypt's minimum cost keeps the suites fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub const TEST_PASSWORD: &str = "Password123!";

/// Connects to `DATABASE_URL` and applies migrations.
/// Returns `None` when no database is configured, and the caller skips.
pub async fn test_pool() -> Option<PgPool> {
    dotenv::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

pub fn signer() -> TokenSigner {
    TokenSigner::with_default_ttl(TEST_SECRET)
}

pub fn auth_service() -> AuthService {
    AuthService::new(signer(), Duration::days(180), TEST_BCRYPT_COST)
}

/// An email no other test (or earlier run) uses.
pub fn unique_email(prefix: &str) -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!(
        "{}_{}_{}@example.com",
        prefix,
        Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// Registers and logs in a user directly through the service layer.
pub async fn create_user(pool: &PgPool, prefix: &str) -> (i32, TokenPair) {
    let auth = auth_service();
    let email = unique_email(prefix);
    let user = auth
        .register(pool, &email, TEST_PASSWORD)
        .await
        .expect("Failed to register test user");
    let tokens = auth
        .login(pool, &email, TEST_PASSWORD)
        .await
        .expect("Failed to log in test user");
    (user.id, tokens)
}

pub async fn cleanup_user(pool: &PgPool, user_id: i32) {
    let _ = todo_api::repository::users::delete_user(pool, user_id).await;
}

/// Builds the full application around `pool`, as `main` does.
#[macro_export]
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new($crate::common::auth_service()))
                .app_data(actix_web::web::Data::new($crate::common::signer()))
                .wrap(actix_web::middleware::Logger::default())
                .wrap(actix_web::middleware::NormalizePath::trim())
                .service(todo_api::routes::health::health)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(todo_api::auth::AuthMiddleware)
                        .configure(todo_api::routes::config),
                ),
        )
        .await
    };
}

pub struct TestUser {
    pub id: i32,
    pub email: String,
    pub tokens: TokenPair,
}

impl TestUser {
    pub fn bearer(&self) -> (actix_web::http::header::HeaderName, String) {
        (
            actix_web::http::header::AUTHORIZATION,
            format!("Bearer {}", self.tokens.access_token),
        )
    }
}

/// Registers and logs in through the HTTP API.
pub async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    prefix: &str,
) -> TestUser {
    let email = unique_email(prefix);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let user: todo_api::models::UserResponse = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let tokens: TokenPair = test::read_body_json(resp).await;

    TestUser {
        id: user.id,
        email,
        tokens,
    }
}

