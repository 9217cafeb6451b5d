//! GraphQL transport.
//!
//! async-graphql parses, validates and executes requests against a schema
//! declared with its dynamic builder. Resolvers lower the selection made on
//! their own field into a [`FieldSelection`](crate::resolve::FieldSelection)
//! and pass it explicitly to the resolution functions.
//!
//! - [`preflight`] -- Parsing, operation choice and size checks.
//! - [`schema`] -- Types, resolvers and the SDL.
//! - [`selection`] -- Lowering of the current field's selection.
//! - [`error`] -- Error codes and the reporting extension.
//! - [`service`] -- Request entry point.

pub mod error;
pub mod preflight;
pub mod schema;
pub mod selection;
pub mod service;

pub use error::TIMEOUT;
pub use schema::{build_schema, sdl};
pub use service::GraphqlService;
