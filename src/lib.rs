//! Wishlist - movie wishlist GraphQL service backed by WatchMode
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod graphql;
pub mod metadata;
pub mod resolve;
pub mod server;
pub mod services;
