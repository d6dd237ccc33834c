//! Domain types for issue tracking.
//!
//! This module contains the issue record as stored, the view returned to
//! clients, and the payloads the resource hands to the store: [`NewIssue`]
//! for inserts, [`IssuePatch`] for partial updates and [`IssueFilter`] for
//! every lookup.

mod filter;

pub use filter::{Criterion, FilterField, FilterValue, IssueFilter};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Current UTC time as an ISO-8601 string with millisecond precision.
///
/// The format (`2024-01-01T12:00:00.000Z`) sorts lexicographically in time
/// order, which is what keeps `updated_on` comparisons meaningful.
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Errors produced when parsing an [`IssueId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// The text is not exactly 24 characters long.
    #[error("issue id must be 24 hex characters, got {0}")]
    InvalidLength(usize),

    /// The text contains a character outside `[0-9a-fA-F]`.
    #[error("issue id contains non-hex character {0:?}")]
    InvalidCharacter(char),
}

/// Unique identifier for an issue.
///
/// Twelve bytes, rendered as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueId([u8; 12]);

impl IssueId {
    /// Build an identifier from its raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Parse an identifier from its 24-character hex form.
    ///
    /// # Errors
    ///
    /// Returns [`IdParseError`] if `text` is not exactly 24 hex characters.
    pub fn parse(text: &str) -> Result<Self, IdParseError> {
        if text.len() != 24 {
            return Err(IdParseError::InvalidLength(text.chars().count()));
        }

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(text, &mut bytes).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { c, .. } => IdParseError::InvalidCharacter(c),
            hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
                IdParseError::InvalidLength(text.chars().count())
            }
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for IssueId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IssueId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IssueId> for String {
    fn from(id: IssueId) -> Self {
        id.to_string()
    }
}

/// An issue as held by the store.
///
/// `project` is stored with the record but never returned to clients; use
/// [`Issue::into_view`] to produce the response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier, assigned by the store.
    #[serde(rename = "_id")]
    pub id: IssueId,

    /// Project namespace, taken from the request path.
    pub project: String,

    /// Issue title
    pub issue_title: String,

    /// Issue description
    pub issue_text: String,

    /// Who reported the issue
    pub created_by: String,

    /// Assignee, empty when unassigned
    pub assigned_to: String,

    /// Free-form status text
    pub status_text: String,

    /// Creation timestamp (ISO 8601)
    pub created_on: String,

    /// Last update timestamp (ISO 8601)
    pub updated_on: String,

    /// Whether the issue is still open
    pub open: bool,
}

impl Issue {
    /// Attach a store-assigned identifier to an insert payload.
    #[must_use]
    pub fn from_new(id: IssueId, new_issue: NewIssue) -> Self {
        Self {
            id,
            project: new_issue.project,
            issue_title: new_issue.issue_title,
            issue_text: new_issue.issue_text,
            created_by: new_issue.created_by,
            assigned_to: new_issue.assigned_to,
            status_text: new_issue.status_text,
            created_on: new_issue.created_on,
            updated_on: new_issue.updated_on,
            open: new_issue.open,
        }
    }

    /// Apply every field present in `patch`, then stamp `updated_on`.
    pub fn apply(&mut self, patch: IssuePatch) {
        if let Some(issue_title) = patch.issue_title {
            self.issue_title = issue_title;
        }
        if let Some(issue_text) = patch.issue_text {
            self.issue_text = issue_text;
        }
        if let Some(created_by) = patch.created_by {
            self.created_by = created_by;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(status_text) = patch.status_text {
            self.status_text = status_text;
        }
        if let Some(open) = patch.open {
            self.open = open;
        }
        self.updated_on = patch.updated_on;
    }

    /// Drop the project and return the client-facing shape.
    #[must_use]
    pub fn into_view(self) -> IssueView {
        IssueView {
            id: self.id,
            issue_title: self.issue_title,
            issue_text: self.issue_text,
            created_by: self.created_by,
            assigned_to: self.assigned_to,
            status_text: self.status_text,
            created_on: self.created_on,
            updated_on: self.updated_on,
            open: self.open,
        }
    }
}

/// An issue as returned to clients: every stored field except `project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueView {
    /// Unique identifier
    #[serde(rename = "_id")]
    pub id: IssueId,

    /// Issue title
    pub issue_title: String,

    /// Issue description
    pub issue_text: String,

    /// Who reported the issue
    pub created_by: String,

    /// Assignee, empty when unassigned
    pub assigned_to: String,

    /// Free-form status text
    pub status_text: String,

    /// Creation timestamp (ISO 8601)
    pub created_on: String,

    /// Last update timestamp (ISO 8601)
    pub updated_on: String,

    /// Whether the issue is still open
    pub open: bool,
}

/// Data for inserting a new issue. The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Project namespace
    pub project: String,

    /// Issue title
    pub issue_title: String,

    /// Issue description
    pub issue_text: String,

    /// Who reported the issue
    pub created_by: String,

    /// Assignee
    pub assigned_to: String,

    /// Status text
    pub status_text: String,

    /// Creation timestamp (ISO 8601)
    pub created_on: String,

    /// Last update timestamp (ISO 8601)
    pub updated_on: String,

    /// Open flag
    pub open: bool,
}

/// Partial update of an issue.
///
/// Only the updatable fields appear here; `project`, `created_on` and the
/// identifier cannot be changed. `updated_on` is always written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePatch {
    /// New title (if updating)
    pub issue_title: Option<String>,

    /// New description (if updating)
    pub issue_text: Option<String>,

    /// New reporter (if updating)
    pub created_by: Option<String>,

    /// New assignee (if updating)
    pub assigned_to: Option<String>,

    /// New status text (if updating)
    pub status_text: Option<String>,

    /// New open flag (if updating)
    pub open: Option<bool>,

    /// Timestamp written as `updated_on`
    pub updated_on: String,
}

impl IssuePatch {
    /// Create a patch that only touches `updated_on`.
    #[must_use]
    pub fn touch(updated_on: String) -> Self {
        Self {
            issue_title: None,
            issue_text: None,
            created_by: None,
            assigned_to: None,
            status_text: None,
            open: None,
            updated_on,
        }
    }
}

/// Named fields of an issue, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueField {
    /// `_id`
    Id,
    /// `project`
    Project,
    /// `issue_title`
    IssueTitle,
    /// `issue_text`
    IssueText,
    /// `created_by`
    CreatedBy,
    /// `assigned_to`
    AssignedTo,
    /// `status_text`
    StatusText,
    /// `created_on`
    CreatedOn,
    /// `updated_on`
    UpdatedOn,
    /// `open`
    Open,
}

impl IssueField {
    /// Fields a client may change through an update, in wire order.
    pub const UPDATABLE: [Self; 6] = [
        Self::IssueTitle,
        Self::IssueText,
        Self::CreatedBy,
        Self::AssignedTo,
        Self::StatusText,
        Self::Open,
    ];

    /// Look up a field by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "_id" => Self::Id,
            "project" => Self::Project,
            "issue_title" => Self::IssueTitle,
            "issue_text" => Self::IssueText,
            "created_by" => Self::CreatedBy,
            "assigned_to" => Self::AssignedTo,
            "status_text" => Self::StatusText,
            "created_on" => Self::CreatedOn,
            "updated_on" => Self::UpdatedOn,
            "open" => Self::Open,
            _ => return None,
        };
        Some(field)
    }

    /// Wire name of the field.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "_id",
            Self::Project => "project",
            Self::IssueTitle => "issue_title",
            Self::IssueText => "issue_text",
            Self::CreatedBy => "created_by",
            Self::AssignedTo => "assigned_to",
            Self::StatusText => "status_text",
            Self::CreatedOn => "created_on",
            Self::UpdatedOn => "updated_on",
            Self::Open => "open",
        }
    }

    /// The text value of this field on `issue`, or `None` for `_id` and `open`.
    #[must_use]
    pub fn text_of(self, issue: &Issue) -> Option<&str> {
        let value = match self {
            Self::Project => &issue.project,
            Self::IssueTitle => &issue.issue_title,
            Self::IssueText => &issue.issue_text,
            Self::CreatedBy => &issue.created_by,
            Self::AssignedTo => &issue.assigned_to,
            Self::StatusText => &issue.status_text,
            Self::CreatedOn => &issue.created_on,
            Self::UpdatedOn => &issue.updated_on,
            Self::Id | Self::Open => return None,
        };
        Some(value)
    }
}

impl fmt::Display for IssueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
