use crate::error::AppError;
use bcrypt::{hash, verify};

/// Hashes a password with an explicit bcrypt cost factor (4..=31).
/// The salt is generated per call, so equal passwords yield different hashes.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks a password against a stored hash using bcrypt's own verifier.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
