#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Domain models, authentication, persistence, routing and error handling for the"]
#![doc = "multi-user todo API. The `todo-api` binary serves it; the `migrate` binary owns the schema."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod security;
pub mod startup;

pub use crate::error::AppError;
