use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const DEFAULT_CATEGORY_COLOR: &str = "#ffffff";

lazy_static! {
    // Hex colour: "#" followed by six hex digits.
    static ref COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// A category owned by one user. `(user_id, name)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub user_id: i32,
}

/// Payload for creating (or finding) a category by name.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    /// Only used when the category does not exist yet.
    #[validate(regex(path = "COLOR_REGEX", message = "Color must look like #a1b2c3"))]
    pub color: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must look like #a1b2c3"))]
    pub color: Option<String>,
}

/// Query string of `DELETE /categories/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteCategoryQuery {
    /// Category that inherits the deleted category's todos.
    pub new_category_id: Option<i32>,
}
