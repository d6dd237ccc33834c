//! Application-level errors and response bodies for the issue resource.
//!
//! Every operation returns `Result<T, ResourceError>`. The transport never
//! turns these into HTTP error statuses: both arms are serialized as a JSON
//! body through [`Reply`], and clients tell them apart by shape alone.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The client omitted or emptied something the operation needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `issue_title`, `issue_text` or `created_by` is absent or empty.
    #[error("required field(s) missing")]
    RequiredFieldsMissing,

    /// The body has no usable `_id`.
    #[error("missing _id")]
    MissingId,

    /// An update sent nothing besides `_id`.
    #[error("no update field(s) sent")]
    NoUpdateFields {
        /// The `_id` the caller sent.
        id: String,
    },
}

/// Error union returned by [`IssueResource`](super::IssueResource) operations.
///
/// The `Display` text of each variant is exactly the `error` string clients
/// receive. Store faults are folded into `Create`, `Update` and `Delete`, so
/// a missing record and a failing backend look the same from outside.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// Request validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store could not insert or re-read the new issue.
    #[error("could not create")]
    Create,

    /// No issue was updated.
    #[error("could not update")]
    Update {
        /// The `_id` the caller sent.
        id: String,
    },

    /// No issue was deleted.
    #[error("could not delete")]
    Delete {
        /// The `_id` the caller sent.
        id: String,
    },
}

impl ResourceError {
    /// The caller's `_id`, for the variants that echo it.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Validation(ValidationError::NoUpdateFields { id })
            | Self::Update { id }
            | Self::Delete { id } => Some(id),
            Self::Validation(_) | Self::Create => None,
        }
    }

    /// Render the error as the body clients receive.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            id: self.id().map(str::to_string),
        }
    }
}

/// `{ "error": ..., "_id"?: ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Fixed error message.
    pub error: String,

    /// The caller's `_id`, when the failing operation echoes it.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// `{ "result": ..., "_id": ... }` returned by successful updates and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Fixed success message.
    pub result: String,

    /// The caller's `_id`.
    #[serde(rename = "_id")]
    pub id: String,
}

impl ActionResult {
    /// `successfully updated`
    #[must_use]
    pub fn updated(id: String) -> Self {
        Self {
            result: "successfully updated".to_string(),
            id,
        }
    }

    /// `successfully deleted`
    #[must_use]
    pub fn deleted(id: String) -> Self {
        Self {
            result: "successfully deleted".to_string(),
            id,
        }
    }
}

/// Either a success value or an [`ErrorBody`], serialized without a tag.
///
/// This is what goes on the wire for every operation, always with the same
/// transport status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply<T> {
    /// Success body.
    Ok(T),
    /// Error body.
    Err(ErrorBody),
}

impl<T> From<Result<T, ResourceError>> for Reply<T> {
    fn from(result: Result<T, ResourceError>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Err(e.to_body()),
        }
    }
}
