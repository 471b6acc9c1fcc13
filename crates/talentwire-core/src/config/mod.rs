//! Configuration loading, validation, and management.

mod loader;
mod schema;

pub use schema::*;
