//! User management endpoints (`/users`).

pub mod models;
pub mod requests;
