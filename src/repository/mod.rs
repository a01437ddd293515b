//! Store access for users and the rows they own.
//!
//! Every query over todos, categories, and tags is filtered by the acting
//! user's id; there is no function here that reads or writes another user's
//! rows. A row that exists but belongs to someone else looks exactly like a
//! missing row (`Ok(None)`).
//!
//! Single-statement functions take any `PgExecutor`, so callers can pass a
//! `&PgPool` or `&mut *tx`. Multi-step writes open their own transaction.

pub mod categories;
pub mod tags;
pub mod todos;
pub mod users;
