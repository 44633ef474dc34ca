//! rolekeep server library: configuration, logging and the REST API.

pub mod config;
pub mod http;
pub mod logging;

pub use config::ServerConfig;
