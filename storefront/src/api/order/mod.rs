//! Order endpoints (`/orders`).

pub mod models;
pub mod requests;
