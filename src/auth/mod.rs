pub mod extractors;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod service;
pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use extractors::{CurrentUser, LoginCredentials};
pub use middleware::AuthMiddleware;
pub use password::{hash_password_with_cost, verify_password};
pub use service::AuthService;
pub use session::resolve_identity;
pub use token::{Claims, TokenSigner};

/// Represents the payload for a user login request.
///
/// Form submissions follow the OAuth2 password flow and name the email
/// `username`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    #[serde(alias = "username")]
    #[validate(email)]
    pub email: String,
    /// User's password.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account. Must be unique.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Must be between 6 and 128 characters long.
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, max = 128))]
    pub refresh_token: String,
}

/// Access and refresh token issued by login and refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed, short-lived token for the `Authorization` header.
    pub access_token: String,
    /// Opaque single-use token for `POST /auth/refresh`.
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenPair {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let short_password_register = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "123".to_string(),
        };
        assert!(short_password_register.validate().is_err());

        let invalid_email_register = RegisterRequest {
            email: "a@".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_register.validate().is_err());
    }

    #[test]
    fn test_token_pair_is_bearer() {
        let pair = TokenPair::bearer("access".into(), "refresh".into());
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "access");
        assert_eq!(json["refresh_token"], "refresh");
    }
}
