//! In-memory storage backend.
//!
//! This module provides a fast, **ephemeral** store where all data is held in
//! RAM and **lost when the process exits**, unless the JSONL functions in
//! this module are used to load and save it. It is suitable for:
//!
//! - Testing the resource layer against a real (but fake) store
//! - Development servers
//! - The working copy behind the JSONL backend
//!
//! # Architecture
//!
//! Issues live in a `Vec<Issue>` so that `find_many` naturally returns them
//! in insertion order. Lookups are linear scans through
//! [`IssueFilter::matches`](crate::domain::IssueFilter::matches), the same
//! predicate every backend uses.
//!
//! # Thread Safety
//!
//! The store is wrapped in `Arc<Mutex<InMemoryStoreInner>>`. Every trait
//! method acquires the lock exactly once, so each scoped write is atomic
//! with respect to concurrent requests.

mod inner;
mod jsonl;
mod trait_impl;

use crate::storage::IssueStore;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use jsonl::{load_from_jsonl, save_to_jsonl, LoadWarning};

/// Thread-safe in-memory storage.
pub(crate) type InMemoryStorage = Arc<Mutex<InMemoryStoreInner>>;

/// Create a new, empty in-memory store.
///
/// # Example
///
/// ```
/// use issuelog::storage::in_memory::new_in_memory_storage;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let storage = new_in_memory_storage();
///     assert!(storage.export_all().await.unwrap().is_empty());
/// }
/// ```
#[must_use]
pub fn new_in_memory_storage() -> Box<dyn IssueStore> {
    Box::new(Arc::new(Mutex::new(InMemoryStoreInner::new())))
}
