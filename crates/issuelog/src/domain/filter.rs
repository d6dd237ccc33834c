//! Issue filters and the query-string filter builder.
//!
//! Every lookup the resource performs is expressed as an [`IssueFilter`]:
//! the project scope plus a list of exact-match criteria. Query parameters
//! are turned into criteria by [`IssueFilter::from_query`], which applies
//! the per-field parsing rules:
//!
//! - `_id` must parse as an [`IssueId`]; a malformed id becomes a criterion
//!   that matches nothing.
//! - `open` accepts the literals `"true"` and `"false"`; any other literal is
//!   kept as text and therefore never equals the stored boolean.
//! - `project` is ignored; the path parameter always wins.
//! - Every other key is an exact, case-sensitive text match. Keys that name
//!   no issue field are kept and match nothing.

use super::{Issue, IssueField, IssueId};

/// Field named by a filter criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterField {
    /// One of the issue's own fields.
    Known(IssueField),
    /// A name no issue carries.
    Unknown(String),
}

/// Literal value a criterion compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Identifier equality.
    Id(IssueId),
    /// Boolean equality.
    Bool(bool),
    /// Exact string equality.
    Text(String),
    /// Matches nothing.
    Never,
}

/// A single `field == value` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criterion {
    /// Field to compare.
    pub field: FilterField,
    /// Value the field must equal.
    pub value: FilterValue,
}

impl Criterion {
    fn matches(&self, issue: &Issue) -> bool {
        let FilterField::Known(field) = &self.field else {
            return false;
        };

        match (field, &self.value) {
            (IssueField::Id, FilterValue::Id(id)) => issue.id == *id,
            (IssueField::Open, FilterValue::Bool(open)) => issue.open == *open,
            (field, FilterValue::Text(text)) => field.text_of(issue) == Some(text.as_str()),
            _ => false,
        }
    }
}

/// Project-scoped filter over issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueFilter {
    /// Project every match must belong to.
    pub project: String,

    /// Additional conditions, all of which must hold.
    pub criteria: Vec<Criterion>,
}

impl IssueFilter {
    /// Filter matching every issue in `project`.
    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            criteria: Vec::new(),
        }
    }

    /// Filter matching the single issue `id` within `project`.
    pub fn scoped(project: impl Into<String>, id: IssueId) -> Self {
        Self::for_project(project).with(IssueField::Id, FilterValue::Id(id))
    }

    /// Add a criterion on a known field.
    #[must_use]
    pub fn with(mut self, field: IssueField, value: FilterValue) -> Self {
        self.criteria.push(Criterion {
            field: FilterField::Known(field),
            value,
        });
        self
    }

    /// Build a filter from decoded query-string pairs.
    ///
    /// Pairs are kept in order; a repeated key adds another criterion, so
    /// conflicting values for the same key match nothing.
    pub fn from_query<K, V>(project: impl Into<String>, pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::for_project(project);

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            let criterion = match IssueField::from_name(key) {
                Some(IssueField::Project) => continue,
                Some(IssueField::Id) => Criterion {
                    field: FilterField::Known(IssueField::Id),
                    value: IssueId::parse(value).map_or(FilterValue::Never, FilterValue::Id),
                },
                Some(IssueField::Open) => Criterion {
                    field: FilterField::Known(IssueField::Open),
                    value: match value {
                        "true" => FilterValue::Bool(true),
                        "false" => FilterValue::Bool(false),
                        other => FilterValue::Text(other.to_string()),
                    },
                },
                Some(field) => Criterion {
                    field: FilterField::Known(field),
                    value: FilterValue::Text(value.to_string()),
                },
                None => Criterion {
                    field: FilterField::Unknown(key.to_string()),
                    value: FilterValue::Text(value.to_string()),
                },
            };
            filter.criteria.push(criterion);
        }

        filter
    }

    /// Whether `issue` satisfies the project scope and every criterion.
    #[must_use]
    pub fn matches(&self, issue: &Issue) -> bool {
        issue.project == self.project && self.criteria.iter().all(|c| c.matches(issue))
    }
}
