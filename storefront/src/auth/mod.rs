//! Authentication module: session state, auth endpoints and route guarding.

pub mod guard;
pub mod models;
pub mod service;
pub mod store;
