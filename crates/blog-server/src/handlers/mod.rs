//! HTTP handlers

pub mod graphql;
pub mod health;

pub use health::health;
