use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use super::patch::double_option;
use super::{Category, Tag};

/// Priority of a todo, P1 being the most urgent.
/// Corresponds to the `todo_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "todo_priority")]
pub enum Priority {
    P1,
    P2,
    #[default]
    P3,
}

/// A `todos` row as stored, before its category and tags are resolved.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub user_id: i32,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A todo with its category and tags resolved, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Todo {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub user_id: i32,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    pub fn from_parts(row: TodoRow, category: Option<Category>, tags: Vec<Tag>) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            priority: row.priority,
            due_date: row.due_date,
            completed: row.completed,
            user_id: row.user_id,
            category,
            tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn validate_tag_names(names: &[String]) -> Result<(), ValidationError> {
    if names.iter().any(|name| name.is_empty() || name.chars().count() > 50) {
        return Err(ValidationError::new("tag_name_length"));
    }
    Ok(())
}

/// Input for creating a todo.
///
/// `category` and `tags` are names, not ids: unknown names are created for the
/// acting user on the fly. An empty `category` means no category.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to `P3`.
    pub priority: Option<Priority>,

    pub due_date: Option<NaiveDate>,

    /// Defaults to `false`.
    pub completed: Option<bool>,

    #[validate(length(max = 50))]
    pub category: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_tag_names")]
    pub tags: Vec<String>,
}

/// Partial update of a todo. Only the fields present in the payload are written.
///
/// - `description`, `due_date`: `null` clears the value.
/// - `category`: `null` or `""` clears the association, a name is upserted.
/// - `tags`: replaces the whole tag set; `[]` removes every tag.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TodoUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 1000))]
    pub description: Option<Option<String>>,

    pub priority: Option<Priority>,

    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,

    pub completed: Option<bool>,

    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 50))]
    pub category: Option<Option<String>>,

    #[validate(custom = "validate_tag_names")]
    pub tags: Option<Vec<String>>,
}

impl TodoUpdate {
    /// The category change requested by this patch: `None` when untouched,
    /// `Some(None)` to clear, `Some(Some(name))` to (re)assign.
    pub fn category_change(&self) -> Option<Option<&str>> {
        self.category.as_ref().map(|category| {
            category
                .as_deref()
                .filter(|name| !name.is_empty())
        })
    }
}

fn default_skip() -> i64 {
    0
}

fn default_limit() -> i64 {
    100
}

/// Pagination for `GET /todos`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoQuery {
    #[serde(default = "default_skip")]
    #[validate(range(min = 0))]
    pub skip: i64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: i64,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            skip: default_skip(),
            limit: default_limit(),
        }
    }
}
