//! Backend API access.
//!
//! `transport` sends raw requests, `client` layers the session and 401
//! recovery on top, and each resource module adds typed endpoint methods to
//! [`client::ApiClient`].

pub mod client;
pub mod common;
pub mod order;
pub mod product;
pub mod transport;
pub mod user;
