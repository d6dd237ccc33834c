//! Core in-memory storage data structures.

use crate::domain::{Issue, IssueFilter, IssueId};
use crate::error::{Error, Result};
use crate::id_generation::IdGenerator;

/// Attempts before giving up on finding an unused identifier.
const MAX_ID_ATTEMPTS: u32 = 16;

/// Inner storage structure (not thread-safe).
///
/// Wrapped in `Arc<Mutex<>>` by [`super::InMemoryStorage`].
pub(crate) struct InMemoryStoreInner {
    /// Issues in insertion order
    pub(super) issues: Vec<Issue>,

    /// Generator for new identifiers
    id_generator: IdGenerator,
}

impl InMemoryStoreInner {
    /// Create a new empty storage instance
    pub(crate) fn new() -> Self {
        Self {
            issues: Vec::new(),
            id_generator: IdGenerator::new(),
        }
    }

    /// Generate an identifier not already used by a stored issue.
    pub(super) fn generate_id(&mut self) -> Result<IssueId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.id_generator.generate();
            if self.position_of_id(&id).is_none() {
                return Ok(id);
            }
            tracing::warn!(%id, "Generated issue id already in use, retrying");
        }
        Err(Error::IdCollision {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    pub(super) fn position_of_id(&self, id: &IssueId) -> Option<usize> {
        self.issues.iter().position(|issue| issue.id == *id)
    }

    /// Index of the first issue matching `filter`.
    pub(super) fn position(&self, filter: &IssueFilter) -> Option<usize> {
        self.issues.iter().position(|issue| filter.matches(issue))
    }
}
