//! Infrastructure: configuration and database adapters.

pub mod config;
pub mod postgres;

pub use config::{AppConfig, ConfigError};
pub use postgres::{LoadError, PostgresSnapshotLoader};
