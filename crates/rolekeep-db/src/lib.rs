//! rolekeep Database: SurrealDB connection management and repository
//! implementations.
//!
//! This crate provides:
//! - Connection settings and connect ([`DbConfig`], [`connect`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - Repository implementations of the `rolekeep-core` traits ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, connect};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
