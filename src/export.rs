//! Tab-separated flashcard export of a user's todos.
//!
//! One line per todo: the title as the card front, the description as the
//! back. The output imports directly into Anki.

use chrono::NaiveDate;

use crate::models::Todo;

pub const EXPORT_HEADER: &str = "Front\tBack";
pub const EXPORT_CONTENT_TYPE: &str = "text/tab-separated-values";

/// Upper bound on exported todos.
pub const EXPORT_LIMIT: i64 = 10_000;

/// Makes a value safe for one TSV cell: tabs and carriage returns become
/// spaces, newlines become `<br>`.
pub fn sanitize_cell(value: Option<&str>) -> String {
    value
        .unwrap_or_default()
        .replace(['\t', '\r'], " ")
        .replace('\n', "<br>")
}

pub fn render_tsv(todos: &[Todo]) -> String {
    let mut lines = Vec::with_capacity(todos.len() + 1);
    lines.push(EXPORT_HEADER.to_string());
    lines.extend(todos.iter().map(|todo| {
        format!(
            "{}\t{}",
            sanitize_cell(Some(&todo.title)),
            sanitize_cell(todo.description.as_deref())
        )
    }));
    lines.join("\n")
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("anki_{}.tsv", date.format("%Y-%m-%d"))
}
