//! Cinerank: a ranked-chart harvester with a run ledger
//!
//! This crate drives a remote browser session through a JavaScript-rendered
//! movie chart, normalizes the extracted records into typed rows, and upserts
//! them into a SQLite store while recording each run's outcome.

pub mod config;
pub mod extract;
pub mod ledger;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Main error type for Cinerank operations
#[derive(Debug, Error)]
pub enum CinerankError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Blocked/verification page served at {url}")]
    Blocked { url: String },

    #[error("Timed out waiting for {url} to render")]
    Timeout { url: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Cinerank operations
pub type Result<T> = std::result::Result<T, CinerankError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use records::{CastMember, Movie, RawCastMember, RawMovie};
pub use storage::{RunStatus, SqliteStore, Storage};
