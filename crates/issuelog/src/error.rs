//! Error types for issuelog storage operations.
//!
//! These errors describe failures of the [`IssueStore`](crate::storage::IssueStore)
//! collaborator. They never reach HTTP clients directly: the resource layer
//! logs them and maps them to the fixed error bodies in
//! [`resource::ResourceError`](crate::resource::ResourceError).

use std::io;
use thiserror::Error;

/// The error type for issuelog storage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized or deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The identifier generator kept producing identifiers already in use.
    #[error("Could not allocate a unique issue id after {attempts} attempts")]
    IdCollision {
        /// Number of identifiers tried.
        attempts: u32,
    },
}

/// A specialized Result type for issuelog storage operations.
pub type Result<T> = std::result::Result<T, Error>;
