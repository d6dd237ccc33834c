//! Server configuration.
//!
//! Settings are resolved in layers: built-in defaults, then an optional YAML
//! file, then command-line flags (each of which can also come from the
//! environment).
//!
//! ```yaml
//! host: 127.0.0.1
//! port: 8080
//! storage:
//!   backend: jsonl
//!   data_file: issues.jsonl
//! ```

use crate::error::{Error, Result};
use clap::Parser;
use issuelog::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Backend name for the ephemeral store.
pub const BACKEND_MEMORY: &str = "memory";

/// Backend name for the JSONL-persisted store.
pub const BACKEND_JSONL: &str = "jsonl";

/// Command-line arguments for `issuelog-server`.
#[derive(Parser, Debug, Default, Clone, PartialEq, Eq)]
#[command(name = "issuelog-server")]
#[command(author, version, about = "Issue tracker HTTP API", long_about = None)]
pub struct ServerArgs {
    /// Path to a YAML config file
    #[arg(short, long, env = "ISSUELOG_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Persist issues to this JSONL file (implies the jsonl backend)
    #[arg(long, env = "ISSUELOG_DATA_FILE", value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

/// Resolved server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen host or IP.
    pub host: String,

    /// Listen port.
    pub port: u16,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type (`memory` or `jsonl`)
    pub backend: String,

    /// Path to the data file, required by the `jsonl` backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BACKEND_MEMORY.to_string(),
            data_file: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    ///
    /// Keys missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigRead` if the file cannot be read and
    /// `Error::ConfigParse` if it is not valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if `content` does not describe a config.
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Build the final configuration from defaults, the config file named
    /// by `args` (if any), and the remaining flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the result
    /// fails [`validate`](Self::validate).
    pub async fn resolve(args: &ServerArgs) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::load(path).await?,
            None => Self::default(),
        };
        let config = base.with_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of `self`.
    #[must_use]
    pub fn with_overrides(mut self, args: &ServerArgs) -> Self {
        if let Some(host) = &args.host {
            self.host.clone_from(host);
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(data_file) = &args.data_file {
            self.storage.backend = BACKEND_JSONL.to_string();
            self.storage.data_file = Some(data_file.clone());
        }
        self
    }

    /// Check that the configuration can be used to start the server.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an empty host or an unusable storage
    /// section.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("host cannot be empty".to_string()));
        }
        self.storage.to_backend().map(|_| ())
    }

    /// The `host:port` string to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl StorageConfig {
    /// Translate the section into a storage backend.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an unknown backend name or a `jsonl`
    /// backend without a data file.
    pub fn to_backend(&self) -> Result<StorageBackend> {
        match self.backend.as_str() {
            BACKEND_MEMORY => Ok(StorageBackend::InMemory),
            BACKEND_JSONL => self
                .data_file
                .clone()
                .map(StorageBackend::Jsonl)
                .ok_or_else(|| {
                    Error::Config("the jsonl backend requires storage.data_file".to_string())
                }),
            other => Err(Error::Config(format!(
                "unknown storage backend '{other}' (expected '{BACKEND_MEMORY}' or '{BACKEND_JSONL}')"
            ))),
        }
    }
}
