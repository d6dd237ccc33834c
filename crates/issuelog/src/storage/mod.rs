//! Storage abstraction layer for issuelog.
//!
//! This module provides the [`IssueStore`] collaborator trait and a factory
//! for creating storage backends:
//!
//! - **In-memory**: ephemeral storage held in a `Vec` behind a mutex
//! - **JSONL**: the in-memory store plus write-through persistence to a
//!   JSON Lines file
//!
//! # Architecture
//!
//! The resource layer never touches records directly. It builds an
//! [`IssueFilter`] (always scoped to a project) and asks the store to
//! insert, find, update or delete through it. The trait is object-safe, so
//! the server holds a `Box<dyn IssueStore>` chosen at startup.
//!
//! # Test Utilities
//!
//! [`UnavailableStore`] fails every call with a storage error. Enable the
//! `test-util` feature to use it from other crates:
//!
//! ```toml
//! [dev-dependencies]
//! issuelog = { version = "...", features = ["test-util"] }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use issuelog::domain::{timestamp_now, IssueFilter, NewIssue};
//! use issuelog::storage::{create_storage, StorageBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut storage = create_storage(StorageBackend::InMemory).await?;
//!
//!     let now = timestamp_now();
//!     let id = storage
//!         .insert(NewIssue {
//!             project: "apitest".to_string(),
//!             issue_title: "Fix error in posting data".to_string(),
//!             issue_text: "When we post data it has an error.".to_string(),
//!             created_by: "Joe".to_string(),
//!             assigned_to: String::new(),
//!             status_text: String::new(),
//!             created_on: now.clone(),
//!             updated_on: now,
//!             open: true,
//!         })
//!         .await?;
//!
//!     let found = storage.find_many(&IssueFilter::for_project("apitest")).await?;
//!     assert_eq!(found[0].id, id);
//!     Ok(())
//! }
//! ```

use crate::domain::{Issue, IssueFilter, IssueId, IssuePatch, NewIssue};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub mod in_memory;

/// Core storage trait for issue records.
///
/// Implementations must be `Send + Sync` so a single instance can be shared
/// across request handlers.
///
/// # Method Categories
///
/// - **Writes**: `insert`, `update_one`, `delete_one`
/// - **Reads**: `find_by_id`, `find_many`, `export_all`
/// - **Persistence**: `save`, `reload`
///
/// # Atomicity
///
/// Each method is a single atomic step with respect to other calls on the
/// same store. Nothing spans two calls: an update racing a delete resolves to
/// whichever call the store sees first.
#[async_trait]
pub trait IssueStore: Send + Sync {
    // ========== Writes ==========

    /// Insert a new issue and return the identifier the store assigned.
    ///
    /// # Errors
    ///
    /// Returns `Error::IdCollision` if no unused identifier could be found,
    /// or a backend error if the record could not be persisted.
    async fn insert(&mut self, issue: NewIssue) -> Result<IssueId>;

    /// Apply `patch` to the first issue matching `filter`.
    ///
    /// Returns the updated issue, or `None` if nothing matched.
    async fn update_one(&mut self, filter: &IssueFilter, patch: IssuePatch)
    -> Result<Option<Issue>>;

    /// Remove the first issue matching `filter`.
    ///
    /// Returns the removed issue, or `None` if nothing matched.
    async fn delete_one(&mut self, filter: &IssueFilter) -> Result<Option<Issue>>;

    // ========== Reads ==========

    /// Get an issue by identifier, regardless of project.
    async fn find_by_id(&self, id: &IssueId) -> Result<Option<Issue>>;

    /// All issues matching `filter`, in insertion order.
    async fn find_many(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Every stored issue across all projects, in insertion order.
    ///
    /// Used for JSONL export.
    async fn export_all(&self) -> Result<Vec<Issue>>;

    // ========== Persistence ==========

    /// Write the current state to persistent storage.
    ///
    /// A no-op for purely in-memory stores.
    async fn save(&self) -> Result<()>;

    /// Discard in-memory state and reload it from persistent storage.
    ///
    /// A no-op for purely in-memory stores.
    async fn reload(&mut self) -> Result<()>;
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

/// Wrapper that adds JSONL write-through persistence to the in-memory store.
///
/// Every mutation that changed something is followed by an atomic rewrite
/// of the file. If that write fails the in-memory state is reloaded from
/// disk and the write error is returned. Should the reload fail as well,
/// memory keeps the unsaved change until a later reload succeeds.
struct JsonlBackedStorage {
    inner: Box<dyn IssueStore>,
    path: PathBuf,
}

impl JsonlBackedStorage {
    async fn persist(&mut self) -> Result<()> {
        let Err(write_error) = self.save().await else {
            return Ok(());
        };
        tracing::error!(path = %self.path.display(), error = %write_error, "JSONL write failed, reloading");

        if let Err(reload_error) = self.reload().await {
            tracing::error!(
                path = %self.path.display(),
                error = %reload_error,
                "JSONL reload failed, memory holds unsaved changes"
            );
        }
        Err(write_error)
    }
}

#[async_trait]
impl IssueStore for JsonlBackedStorage {
    async fn insert(&mut self, issue: NewIssue) -> Result<IssueId> {
        let id = self.inner.insert(issue).await?;
        self.persist().await?;
        Ok(id)
    }

    async fn update_one(
        &mut self,
        filter: &IssueFilter,
        patch: IssuePatch,
    ) -> Result<Option<Issue>> {
        let updated = self.inner.update_one(filter, patch).await?;
        if updated.is_some() {
            self.persist().await?;
        }
        Ok(updated)
    }

    async fn delete_one(&mut self, filter: &IssueFilter) -> Result<Option<Issue>> {
        let deleted = self.inner.delete_one(filter).await?;
        if deleted.is_some() {
            self.persist().await?;
        }
        Ok(deleted)
    }

    async fn find_by_id(&self, id: &IssueId) -> Result<Option<Issue>> {
        self.inner.find_by_id(id).await
    }

    async fn find_many(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.inner.find_many(filter).await
    }

    async fn export_all(&self) -> Result<Vec<Issue>> {
        self.inner.export_all().await
    }

    async fn save(&self) -> Result<()> {
        in_memory::save_to_jsonl(self.inner.as_ref(), &self.path).await
    }

    async fn reload(&mut self) -> Result<()> {
        self.inner = load_or_empty(&self.path).await?;
        Ok(())
    }
}

/// Load the JSONL file at `path`, or start empty if it does not exist yet.
async fn load_or_empty(path: &Path) -> Result<Box<dyn IssueStore>> {
    if !tokio::fs::try_exists(path).await? {
        return Ok(in_memory::new_in_memory_storage());
    }

    let (storage, warnings) = in_memory::load_from_jsonl(path).await?;
    // Log warnings but continue - storage is still usable
    for warning in &warnings {
        tracing::warn!(warning = ?warning, "JSONL load warning");
    }
    Ok(storage)
}

/// Create a storage instance for the given backend.
///
/// # Errors
///
/// - `Error::Io` if the JSONL file exists but cannot be read
pub async fn create_storage(backend: StorageBackend) -> Result<Box<dyn IssueStore>> {
    match backend {
        StorageBackend::InMemory => Ok(in_memory::new_in_memory_storage()),
        StorageBackend::Jsonl(path) => {
            let inner = load_or_empty(&path).await?;
            Ok(Box::new(JsonlBackedStorage { inner, path }))
        }
    }
}

// ========== Test Utilities ==========

/// Store whose every call fails, standing in for an unreachable backend.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct UnavailableStore;

#[cfg(any(test, feature = "test-util"))]
impl UnavailableStore {
    /// Create a new `UnavailableStore`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn fail<T>() -> Result<T> {
        Err(crate::error::Error::Storage(
            "backend unavailable".to_string(),
        ))
    }
}

#[cfg(any(test, feature = "test-util"))]
#[async_trait]
impl IssueStore for UnavailableStore {
    async fn insert(&mut self, _issue: NewIssue) -> Result<IssueId> {
        Self::fail()
    }

    async fn update_one(
        &mut self,
        _filter: &IssueFilter,
        _patch: IssuePatch,
    ) -> Result<Option<Issue>> {
        Self::fail()
    }

    async fn delete_one(&mut self, _filter: &IssueFilter) -> Result<Option<Issue>> {
        Self::fail()
    }

    async fn find_by_id(&self, _id: &IssueId) -> Result<Option<Issue>> {
        Self::fail()
    }

    async fn find_many(&self, _filter: &IssueFilter) -> Result<Vec<Issue>> {
        Self::fail()
    }

    async fn export_all(&self) -> Result<Vec<Issue>> {
        Self::fail()
    }

    async fn save(&self) -> Result<()> {
        Self::fail()
    }

    async fn reload(&mut self) -> Result<()> {
        Self::fail()
    }
}
