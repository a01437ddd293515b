use crate::{
    auth::{AuthService, CurrentUser, LoginCredentials, RefreshRequest, RegisterRequest},
    error::AppError,
    models::UserResponse,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns it. Fails with `409 Conflict` when the
/// email is already registered.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    auth: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = auth
        .register(&pool, &register_data.email, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Login user
///
/// Authenticates a user and returns an access/refresh token pair.
///
/// Accepts JSON `{email, password}` or an OAuth2 password form
/// (`username`, `password`), URL-encoded or multipart.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    auth: web::Data<AuthService>,
    credentials: LoginCredentials,
) -> Result<impl Responder, AppError> {
    let login_data = credentials.into_inner();
    login_data.validate()?;

    let tokens = auth
        .login(&pool, &login_data.email, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// Exchange a refresh token for a new token pair.
///
/// The presented refresh token is consumed.
#[post("/refresh")]
pub async fn refresh(
    pool: web::Data<PgPool>,
    auth: web::Data<AuthService>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    refresh_data.validate()?;

    let tokens = auth.refresh(&pool, &refresh_data.refresh_token).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

#[get("/me")]
pub async fn me(current_user: CurrentUser) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(UserResponse::from(current_user.0)))
}
