//! Decoding request bodies into typed payloads.
//!
//! Bodies arrive as JSON objects (form submissions are converted to objects
//! of strings by the server). A field only counts as *sent* when its value is
//! truthy: `null`, `false`, `0`, `""` and an absent key are all treated as
//! not sent. A consequence is that an update can never set a text field to
//! `""` or `open` to `false` through a JSON boolean; the string `"false"`
//! still works.

use crate::domain::{IssueField, IssuePatch, NewIssue};
use serde_json::{Map, Value};

/// A decoded request body.
pub type Body = Map<String, Value>;

/// Whether `value` counts as sent.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn sent<'a>(body: &'a Body, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|value| is_truthy(value))
}

/// Scalars become text the way a document store casts them.
fn cast_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Boolean casting for `open`: `true`, `1`, `"true"`, `"1"` and `"yes"` are
/// true; `false`, `0`, `"false"`, `"0"` and `"no"` are false.
fn cast_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn sent_text(body: &Body, field: IssueField) -> Option<String> {
    sent(body, field.name()).and_then(cast_text)
}

/// The `_id` the caller sent, as text, if it was sent at all.
///
/// Strings are returned verbatim; other truthy values in their JSON form.
#[must_use]
pub fn sent_id(body: &Body) -> Option<String> {
    sent(body, IssueField::Id.name()).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Build an insert payload from a create body.
///
/// Returns `None` when any required field is missing, empty or not a scalar.
/// Optional text fields default to `""`; `open` always starts `true`.
#[must_use]
pub fn new_issue_from_body(project: &str, body: &Body, now: String) -> Option<NewIssue> {
    let issue_title = sent_text(body, IssueField::IssueTitle)?;
    let issue_text = sent_text(body, IssueField::IssueText)?;
    let created_by = sent_text(body, IssueField::CreatedBy)?;

    Some(NewIssue {
        project: project.to_string(),
        issue_title,
        issue_text,
        created_by,
        assigned_to: sent_text(body, IssueField::AssignedTo).unwrap_or_default(),
        status_text: sent_text(body, IssueField::StatusText).unwrap_or_default(),
        created_on: now.clone(),
        updated_on: now,
        open: true,
    })
}

/// A sent update field whose value cannot be stored in that field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UncastableField(pub IssueField);

/// Build a patch from an update body.
///
/// Every sent key other than `_id` counts as an update field, but only
/// [`IssueField::UPDATABLE`] keys are applied; `project`, the timestamps and
/// unknown keys are dropped. A body whose only sent keys are dropped ones
/// still yields a patch that touches `updated_on`. Returns `Ok(None)` when
/// nothing besides `_id` was sent.
///
/// # Errors
///
/// Returns [`UncastableField`] for the first sent field whose value has the
/// wrong shape (an object for a text field, `"maybe"` for `open`, ...).
pub fn patch_from_body(body: &Body, now: String) -> Result<Option<IssuePatch>, UncastableField> {
    let id_key = IssueField::Id.name();
    if !body
        .iter()
        .any(|(key, value)| key != id_key && is_truthy(value))
    {
        return Ok(None);
    }

    let sent_fields = IssueField::UPDATABLE
        .into_iter()
        .filter_map(|field| sent(body, field.name()).map(|value| (field, value)));

    let mut patch = IssuePatch::touch(now);
    for (field, value) in sent_fields {
        if field == IssueField::Open {
            patch.open = Some(cast_bool(value).ok_or(UncastableField(field))?);
            continue;
        }

        let text = cast_text(value).ok_or(UncastableField(field))?;
        let slot = match field {
            IssueField::IssueTitle => &mut patch.issue_title,
            IssueField::IssueText => &mut patch.issue_text,
            IssueField::CreatedBy => &mut patch.created_by,
            IssueField::AssignedTo => &mut patch.assigned_to,
            IssueField::StatusText => &mut patch.status_text,
            _ => continue,
        };
        *slot = Some(text);
    }

    Ok(Some(patch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const NOW: &str = "2024-01-01T12:00:00.000Z";

    fn body(value: Value) -> Body {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[rstest]
    #[case(json!(null), false)]
    #[case(json!(false), false)]
    #[case(json!(0), false)]
    #[case(json!(0.0), false)]
    #[case(json!(""), false)]
    #[case(json!(true), true)]
    #[case(json!(-1), true)]
    #[case(json!("0"), true)]
    #[case(json!("false"), true)]
    #[case(json!([]), true)]
    #[case(json!({}), true)]
    fn test_truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_truthy(&value), expected);
    }

    #[test]
    fn test_new_issue_defaults_optional_fields() {
        let new_issue = new_issue_from_body(
            "apitest",
            &body(json!({"issue_title": "t", "issue_text": "x", "created_by": "me"})),
            NOW.to_string(),
        )
        .unwrap();

        assert_eq!(new_issue.project, "apitest");
        assert_eq!(new_issue.assigned_to, "");
        assert_eq!(new_issue.status_text, "");
        assert_eq!(new_issue.created_on, NOW);
        assert_eq!(new_issue.updated_on, NOW);
        assert!(new_issue.open);
    }

    #[rstest]
    #[case(json!({"issue_text": "x", "created_by": "me"}))]
    #[case(json!({"issue_title": "", "issue_text": "x", "created_by": "me"}))]
    #[case(json!({"issue_title": "t", "issue_text": null, "created_by": "me"}))]
    #[case(json!({"issue_title": "t", "issue_text": "x", "created_by": 0}))]
    #[case(json!({"issue_title": {"nested": 1}, "issue_text": "x", "created_by": "me"}))]
    fn test_new_issue_requires_fields(#[case] value: Value) {
        assert!(new_issue_from_body("apitest", &body(value), NOW.to_string()).is_none());
    }

    #[test]
    fn test_new_issue_ignores_client_open_and_project() {
        let new_issue = new_issue_from_body(
            "apitest",
            &body(json!({
                "issue_title": "t", "issue_text": "x", "created_by": "me",
                "open": false, "project": "elsewhere", "assigned_to": 42
            })),
            NOW.to_string(),
        )
        .unwrap();

        assert!(new_issue.open);
        assert_eq!(new_issue.project, "apitest");
        assert_eq!(new_issue.assigned_to, "42");
    }

    #[test]
    fn test_patch_none_when_only_id_or_falsy() {
        let value = json!({"_id": "abc", "issue_title": "", "open": false, "status_text": null});
        assert_eq!(patch_from_body(&body(value), NOW.to_string()), Ok(None));
    }

    #[rstest]
    #[case(json!({"_id": "abc", "color": "red"}))]
    #[case(json!({"_id": "abc", "project": "x"}))]
    #[case(json!({"_id": "abc", "created_on": "yesterday", "updated_on": "today"}))]
    fn test_patch_dropped_keys_still_count(#[case] value: Value) {
        assert_eq!(
            patch_from_body(&body(value), NOW.to_string()),
            Ok(Some(IssuePatch::touch(NOW.to_string())))
        );
    }

    #[test]
    fn test_patch_collects_sent_fields() {
        let value = json!({"_id": "abc", "issue_text": "new text", "open": "false", "assigned_to": ""});
        let patch = patch_from_body(&body(value), NOW.to_string())
            .unwrap()
            .unwrap();

        let mut expected = IssuePatch::touch(NOW.to_string());
        expected.issue_text = Some("new text".to_string());
        expected.open = Some(false);
        assert_eq!(patch, expected);
    }

    #[rstest]
    #[case(json!({"open": "maybe"}), IssueField::Open)]
    #[case(json!({"open": 2}), IssueField::Open)]
    #[case(json!({"open": "TRUE"}), IssueField::Open)]
    #[case(json!({"status_text": ["a"]}), IssueField::StatusText)]
    fn test_patch_uncastable(#[case] value: Value, #[case] field: IssueField) {
        assert_eq!(
            patch_from_body(&body(value), NOW.to_string()),
            Err(UncastableField(field))
        );
    }

    #[rstest]
    #[case(json!("1"), true)]
    #[case(json!("yes"), true)]
    #[case(json!(1), true)]
    #[case(json!("0"), false)]
    #[case(json!("no"), false)]
    #[case(json!("false"), false)]
    fn test_open_casting(#[case] open: Value, #[case] expected: bool) {
        let value = json!({"_id": "abc", "open": open});
        let patch = patch_from_body(&body(value), NOW.to_string())
            .unwrap()
            .unwrap();
        assert_eq!(patch.open, Some(expected));
    }

    #[rstest]
    #[case(json!({"_id": "6634db921a9844bc431a374b"}), Some("6634db921a9844bc431a374b"))]
    #[case(json!({"_id": 17}), Some("17"))]
    #[case(json!({"_id": ""}), None)]
    #[case(json!({"_id": 0}), None)]
    #[case(json!({}), None)]
    fn test_sent_id(#[case] value: Value, #[case] expected: Option<&str>) {
        assert_eq!(sent_id(&body(value)).as_deref(), expected);
    }
}
