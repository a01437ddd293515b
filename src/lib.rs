#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Accounts with access/refresh token sessions, per-user todos organised by"]
#![doc = "categories and tags, and a TSV export. The server binary (`main.rs`) wires"]
#![doc = "these modules into an actix-web application."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod repository;
pub mod routes;

pub use crate::error::AppError;
