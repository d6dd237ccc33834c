//! Error types for the issuelog server.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while configuring or running the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`ServerConfig`](crate::ServerConfig).
    #[error("Invalid config file {path}: {source}")]
    ConfigParse {
        /// Path of the config file.
        path: PathBuf,
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The listen address could not be bound.
    #[error("Failed to bind {address}: {source}")]
    Bind {
        /// The address that was requested.
        address: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An error from the issuelog storage layer.
    #[error("Storage error: {0}")]
    Storage(#[from] issuelog::error::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for issuelog server operations.
pub type Result<T> = std::result::Result<T, Error>;
