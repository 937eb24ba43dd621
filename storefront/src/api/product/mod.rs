//! Product catalogue endpoints (`/products`).

pub mod models;
pub mod requests;
