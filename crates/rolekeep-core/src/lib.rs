//! rolekeep Core: domain models, repository traits, error types and the
//! batch rules for permission writes.
//!
//! Storage backends implement the traits in [`repository`]; the HTTP layer
//! only ever talks to those traits.

pub mod batch;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{RolekeepError, RolekeepResult};
