//! The issue resource: create, list, update and delete for one project.
//!
//! [`IssueResource`] is transport-agnostic. Each operation takes the project
//! name from the path plus the decoded query or body, talks to the
//! [`IssueStore`], and returns `Result<T, ResourceError>`. The HTTP layer
//! wraps that in a [`Reply`] and always answers with the same status.
//!
//! # Example
//!
//! ```
//! use issuelog::resource::IssueResource;
//! use issuelog::storage::in_memory::new_in_memory_storage;
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let resource = IssueResource::new(new_in_memory_storage());
//!     let body = json!({"issue_title": "t", "issue_text": "x", "created_by": "me"});
//!
//!     let created = resource
//!         .create("apitest", body.as_object().unwrap())
//!         .await
//!         .unwrap();
//!     assert!(created.open);
//!
//!     let listed = resource.list("apitest", &[("open", "true")]).await;
//!     assert_eq!(listed, vec![created]);
//! }
//! ```

mod body;
mod error;

pub use body::{is_truthy, Body};
pub use error::{ActionResult, ErrorBody, Reply, ResourceError, ValidationError};

use crate::domain::{timestamp_now, IssueFilter, IssueId, IssueView};
use crate::storage::IssueStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Shared handle to the store, as held by the resource.
type SharedStore = Arc<RwLock<Box<dyn IssueStore>>>;

/// Request handlers for `/api/issues/{project}`.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct IssueResource {
    storage: SharedStore,
}

impl std::fmt::Debug for IssueResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueResource")
            .field("storage", &"<dyn IssueStore>")
            .finish()
    }
}

impl IssueResource {
    /// Create a resource that owns `storage`.
    #[must_use]
    pub fn new(storage: Box<dyn IssueStore>) -> Self {
        Self {
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    /// Create an issue in `project` (POST).
    ///
    /// The stored record is read back by id and returned without `project`.
    ///
    /// # Errors
    ///
    /// - `ValidationError::RequiredFieldsMissing` if `issue_title`,
    ///   `issue_text` or `created_by` was not sent
    /// - `ResourceError::Create` if the store fails to insert or re-read
    pub async fn create(&self, project: &str, body: &Body) -> Result<IssueView, ResourceError> {
        let new_issue = body::new_issue_from_body(project, body, timestamp_now())
            .ok_or(ValidationError::RequiredFieldsMissing)?;

        let id = self
            .storage
            .write()
            .await
            .insert(new_issue)
            .await
            .map_err(|e| {
                error!(project, error = %e, "Failed to insert issue");
                ResourceError::Create
            })?;
        info!(project, %id, "New issue created");

        match self.storage.read().await.find_by_id(&id).await {
            Ok(Some(issue)) => Ok(issue.into_view()),
            Ok(None) => {
                error!(project, %id, "Created issue vanished before re-read");
                Err(ResourceError::Create)
            }
            Err(e) => {
                error!(project, %id, error = %e, "Failed to re-read created issue");
                Err(ResourceError::Create)
            }
        }
    }

    /// List issues in `project` matching every query pair (GET).
    ///
    /// Never fails: no match, an unknown project and a store fault all yield
    /// an empty list. Faults are logged.
    pub async fn list<K, V>(&self, project: &str, query: &[(K, V)]) -> Vec<IssueView>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let filter = IssueFilter::from_query(project, query);
        debug!(?filter, "Listing issues");

        match self.storage.read().await.find_many(&filter).await {
            Ok(issues) => issues.into_iter().map(|issue| issue.into_view()).collect(),
            Err(e) => {
                error!(project, error = %e, "Failed to list issues");
                Vec::new()
            }
        }
    }

    /// Apply a partial update to one issue in `project` (PUT).
    ///
    /// Checks run in order and each stops the request: missing `_id`, no
    /// other field sent, then the scoped write itself. Fields that cannot be
    /// changed still count as sent; they are dropped and only `updated_on`
    /// moves.
    ///
    /// # Errors
    ///
    /// - `ValidationError::MissingId` if `_id` was not sent
    /// - `ValidationError::NoUpdateFields` if nothing besides `_id` was sent
    /// - `ResourceError::Update` if the id is malformed, matches nothing in
    ///   `project`, a value cannot be stored, or the store fails
    pub async fn update(&self, project: &str, body: &Body) -> Result<ActionResult, ResourceError> {
        let id = body::sent_id(body).ok_or(ValidationError::MissingId)?;

        let patch = match body::patch_from_body(body, timestamp_now()) {
            Ok(Some(patch)) => patch,
            Ok(None) => return Err(ValidationError::NoUpdateFields { id }.into()),
            Err(body::UncastableField(field)) => {
                warn!(project, %id, %field, "Rejected update value");
                return Err(ResourceError::Update { id });
            }
        };

        let Ok(issue_id) = IssueId::parse(&id) else {
            debug!(project, %id, "Update with malformed id");
            return Err(ResourceError::Update { id });
        };

        let filter = IssueFilter::scoped(project, issue_id);
        match self.storage.write().await.update_one(&filter, patch).await {
            Ok(Some(_)) => Ok(ActionResult::updated(id)),
            Ok(None) => Err(ResourceError::Update { id }),
            Err(e) => {
                error!(project, %id, error = %e, "Failed to update issue");
                Err(ResourceError::Update { id })
            }
        }
    }

    /// Delete one issue in `project` (DELETE).
    ///
    /// # Errors
    ///
    /// - `ValidationError::MissingId` if `_id` was not sent
    /// - `ResourceError::Delete` if the id is malformed, matches nothing in
    ///   `project`, or the store fails
    pub async fn delete(&self, project: &str, body: &Body) -> Result<ActionResult, ResourceError> {
        let id = body::sent_id(body).ok_or(ValidationError::MissingId)?;

        let Ok(issue_id) = IssueId::parse(&id) else {
            debug!(project, %id, "Delete with malformed id");
            return Err(ResourceError::Delete { id });
        };

        let filter = IssueFilter::scoped(project, issue_id);
        match self.storage.write().await.delete_one(&filter).await {
            Ok(Some(_)) => Ok(ActionResult::deleted(id)),
            Ok(None) => Err(ResourceError::Delete { id }),
            Err(e) => {
                error!(project, %id, error = %e, "Failed to delete issue");
                Err(ResourceError::Delete { id })
            }
        }
    }
}
