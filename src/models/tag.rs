use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A tag owned by one user. `(user_id, name)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct TagInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}
