use actix_multipart::Multipart;
use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use futures::TryStreamExt;
use sqlx::PgPool;

use crate::auth::middleware::bearer_token;
use crate::auth::session::user_for_claims;
use crate::auth::token::{Claims, TokenSigner};
use crate::auth::LoginRequest;
use crate::error::AppError;
use crate::models::User;

/// Largest accepted multipart login field.
const MAX_FORM_FIELD_BYTES: usize = 1024;

/// The user making the request.
///
/// Uses the `Claims` left by `AuthMiddleware` when present; otherwise it
/// verifies the bearer token itself. Either way the user row is loaded, so a
/// deleted account is rejected even while its token's signature holds.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = match req.extensions().get::<Claims>().cloned() {
            Some(claims) => Ok(claims),
            None => match (
                req.app_data::<web::Data<TokenSigner>>(),
                bearer_token(req.headers()),
            ) {
                (Some(signer), Some(token)) => signer.validate_access_token(token),
                (None, _) => Err(AppError::InternalServerError(
                    "TokenSigner is not configured".into(),
                )),
                (_, None) => Err(AppError::Unauthorized("Missing token".into())),
            },
        };
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            let claims = claims?;
            let pool = pool.ok_or_else(|| {
                AppError::InternalServerError("Database pool is not configured".into())
            })?;
            let user = user_for_claims(&pool, &claims).await?;
            Ok(CurrentUser(user))
        })
    }
}

/// Login credentials from a JSON body, a URL-encoded form, or a multipart
/// form, chosen by `Content-Type`.
#[derive(Debug)]
pub struct LoginCredentials(pub LoginRequest);

impl LoginCredentials {
    pub fn into_inner(self) -> LoginRequest {
        self.0
    }
}

impl FromRequest for LoginCredentials {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let content_type = req.content_type().to_ascii_lowercase();
        let req = req.clone();
        let mut payload = payload.take();

        Box::pin(async move {
            let credentials = match content_type.as_str() {
                "multipart/form-data" => {
                    read_multipart(Multipart::new(req.headers(), payload)).await?
                }
                "application/x-www-form-urlencoded" => {
                    web::Form::<LoginRequest>::from_request(&req, &mut payload)
                        .await?
                        .into_inner()
                }
                _ => web::Json::<LoginRequest>::from_request(&req, &mut payload)
                    .await?
                    .into_inner(),
            };
            Ok(LoginCredentials(credentials))
        })
    }
}

fn malformed_form(err: actix_multipart::MultipartError) -> AppError {
    AppError::ValidationError(format!("Malformed form: {}", err))
}

async fn read_multipart(mut form: Multipart) -> Result<LoginRequest, AppError> {
    let mut email = None;
    let mut password = None;

    while let Some(mut field) = form.try_next().await.map_err(malformed_form)? {
        let name = field.name().to_string();
        let mut value = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed_form)? {
            if value.len() + chunk.len() > MAX_FORM_FIELD_BYTES {
                return Err(AppError::ValidationError(format!("Field {} is too large", name)));
            }
            value.extend_from_slice(&chunk);
        }

        let value = String::from_utf8(value)
            .map_err(|_| AppError::ValidationError(format!("Field {} is not valid UTF-8", name)))?;
        match name.as_str() {
            "username" | "email" => email = Some(value),
            "password" => password = Some(value),
            _ => {}
        }
    }

    match (email, password) {
        (Some(email), Some(password)) => Ok(LoginRequest { email, password }),
        _ => Err(AppError::ValidationError(
            "Fields username and password are required".into(),
        )),
    }
}
