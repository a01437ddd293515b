use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenSigner;
use crate::error::AppError;

/// Paths reachable without an access token.
const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/refresh",
];

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(headers: &header::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a valid access token and stores the decoded
/// `Claims` in the request extensions for `CurrentUser`.
///
/// Verification is stateless; the `TokenSigner` is taken from app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.iter().any(|path| req.path() == *path) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let Some(signer) = req.app_data::<web::Data<TokenSigner>>().cloned() else {
            let app_err = AppError::InternalServerError("TokenSigner is not configured".into());
            return Box::pin(async move { Err(app_err.into()) });
        };

        let claims = match bearer_token(req.headers()) {
            Some(token) => signer.validate_access_token(token),
            None => Err(AppError::Unauthorized("Missing token".into())),
        };

        match claims {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(app_err) => {
                log::warn!("Rejected request to {}: {}", req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::Claims;
    use actix_web::{http::StatusCode, test, App, HttpRequest, HttpResponse};

    const SECRET: &str = "middleware_test_secret";

    async fn echo_subject(req: HttpRequest) -> HttpResponse {
        let sub = req.extensions().get::<Claims>().and_then(|claims| claims.user_id().ok());
        HttpResponse::Ok().json(sub)
    }

    async fn open() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    macro_rules! test_app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(TokenSigner::with_default_ttl(SECRET)))
                    .wrap(AuthMiddleware)
                    .route("/api/todos", web::get().to(echo_subject))
                    .route("/api/auth/login", web::post().to(open)),
            )
            .await
        };
    }

    #[actix_rt::test]
    async fn test_valid_token_inserts_claims() {
        let app = test_app!();
        let token = TokenSigner::with_default_ttl(SECRET)
            .issue_access_token(42)
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/api/todos")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let sub: Option<i32> = test::read_body_json(resp).await;
        assert_eq!(sub, Some(42));
    }

    #[actix_rt::test]
    async fn test_missing_token_is_unauthorized() {
        let app = test_app!();
        let req = test::TestRequest::get().uri("/api/todos").to_request();

        let resp = test::try_call_service(&app, req).await;
        let err = resp.err().expect("request without token should fail");
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_foreign_token_is_unauthorized() {
        let app = test_app!();
        let token = TokenSigner::with_default_ttl("other_secret")
            .issue_access_token(42)
            .unwrap();

        let req = test::TestRequest::get()
            .uri("/api/todos")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();

        let err = test::try_call_service(&app, req)
            .await
            .err()
            .expect("token signed with another secret should fail");
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_public_path_skips_authentication() {
        let app = test_app!();
        let req = test::TestRequest::post().uri("/api/auth/login").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_bearer_token_parsing() {
        let req = test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), Some("abc.def.ghi"));

        let req = test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), None);

        let req = test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert_eq!(bearer_token(req.headers()), None);
    }
}
