pub mod category;
pub mod patch;
pub mod refresh_token;
pub mod tag;
pub mod todo;
pub mod user;

pub use category::{Category, CategoryInput, CategoryUpdate, DeleteCategoryQuery, DEFAULT_CATEGORY_COLOR};
pub use refresh_token::RefreshToken;
pub use tag::{Tag, TagInput};
pub use todo::{Priority, Todo, TodoInput, TodoQuery, TodoRow, TodoUpdate};
pub use user::{User, UserResponse};
