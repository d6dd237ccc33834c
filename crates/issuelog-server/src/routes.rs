//! HTTP routes.
//!
//! | Method | Path                   | Handler                      |
//! |--------|------------------------|------------------------------|
//! | GET    | `/api/issues/{project}`| [`IssueResource::list`]      |
//! | POST   | `/api/issues/{project}`| [`IssueResource::create`]    |
//! | PUT    | `/api/issues/{project}`| [`IssueResource::update`]    |
//! | DELETE | `/api/issues/{project}`| [`IssueResource::delete`]    |
//! | GET    | `/health`              | plain `OK`                   |
//!
//! Every issue route answers `200 OK` with a JSON body.

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{FromRequest, Path, RawQuery, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::routing::get;
use issuelog::domain::IssueView;
use issuelog::resource::{ActionResult, Body, IssueResource, Reply};
use serde_json::Value;
use std::convert::Infallible;
use tower_http::trace::TraceLayer;

/// Route for the issue resource.
pub const ISSUES_PATH: &str = "/api/issues/{project}";

/// Route for the liveness probe.
pub const HEALTH_PATH: &str = "/health";

/// Build the application router around `resource`.
pub fn router(resource: IssueResource) -> Router {
    Router::new()
        .route(
            ISSUES_PATH,
            get(list_issues)
                .post(create_issue)
                .put(update_issue)
                .delete(delete_issue),
        )
        .route(HEALTH_PATH, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(resource)
}

async fn health() -> &'static str {
    "OK"
}

async fn list_issues(
    State(resource): State<IssueResource>,
    Path(project): Path<String>,
    RawQuery(query): RawQuery,
) -> Json<Vec<IssueView>> {
    let parsed = query
        .as_deref()
        .map(|raw| serde_urlencoded::from_str::<Vec<(String, String)>>(raw));
    let pairs = match parsed {
        None => Vec::new(),
        Some(Ok(pairs)) => pairs,
        Some(Err(e)) => {
            tracing::debug!(error = %e, "Unreadable query string");
            return Json(Vec::new());
        }
    };
    Json(resource.list(&project, &pairs).await)
}

async fn create_issue(
    State(resource): State<IssueResource>,
    Path(project): Path<String>,
    RequestBody(body): RequestBody,
) -> Json<Reply<IssueView>> {
    Json(resource.create(&project, &body).await.into())
}

async fn update_issue(
    State(resource): State<IssueResource>,
    Path(project): Path<String>,
    RequestBody(body): RequestBody,
) -> Json<Reply<ActionResult>> {
    Json(resource.update(&project, &body).await.into())
}

async fn delete_issue(
    State(resource): State<IssueResource>,
    Path(project): Path<String>,
    RequestBody(body): RequestBody,
) -> Json<Reply<ActionResult>> {
    Json(resource.delete(&project, &body).await.into())
}

/// A request body decoded into a field map.
///
/// JSON objects are taken as-is. Anything else is read as an
/// `application/x-www-form-urlencoded` form whose values become strings.
/// A body that cannot be decoded yields an empty map, so the resource
/// reports the missing fields instead of the transport rejecting the
/// request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody(pub Body);

impl<S> FromRequest<S> for RequestBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = is_json(req.headers());
        match Bytes::from_request(req, state).await {
            Ok(bytes) => Ok(Self(decode_body(&bytes, json))),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Unreadable request body");
                Ok(Self::default())
            }
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .is_some_and(|mime| {
            mime.eq_ignore_ascii_case("application/json")
                || (mime.starts_with("application/") && mime.ends_with("+json"))
        })
}

/// Decode raw body bytes into a field map.
///
/// Repeated form keys keep their last value.
#[must_use]
pub fn decode_body(bytes: &[u8], json: bool) -> Body {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Body::new();
    }

    if json {
        return match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::debug!("JSON body is not an object");
                Body::new()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Malformed JSON body");
                Body::new()
            }
        };
    }

    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes) {
        Ok(pairs) => pairs
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "Malformed form body");
            Body::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("application/json", true)]
    #[case("application/json; charset=utf-8", true)]
    #[case("Application/JSON", true)]
    #[case("application/merge-patch+json", true)]
    #[case("application/x-www-form-urlencoded", false)]
    #[case("text/plain", false)]
    fn test_is_json(#[case] content_type: &str, #[case] expected: bool) {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        assert_eq!(is_json(&headers), expected);
    }

    #[test]
    fn test_missing_content_type_is_form() {
        assert!(!is_json(&HeaderMap::new()));
    }

    #[test]
    fn test_decode_json_object() {
        let body = decode_body(br#"{"issue_title":"t","open":false,"n":3}"#, true);
        assert_eq!(
            Value::Object(body),
            json!({"issue_title": "t", "open": false, "n": 3})
        );
    }

    #[rstest]
    #[case(b"[1,2]".as_slice())]
    #[case(b"\"text\"".as_slice())]
    #[case(b"{not json".as_slice())]
    #[case(b"   ".as_slice())]
    fn test_decode_unusable_json_is_empty(#[case] bytes: &[u8]) {
        assert!(decode_body(bytes, true).is_empty());
    }

    #[test]
    fn test_decode_form() {
        let body = decode_body(b"_id=abc&issue_text=hello+world&open=false&open=true", false);
        assert_eq!(
            Value::Object(body),
            json!({"_id": "abc", "issue_text": "hello world", "open": "true"})
        );
    }
}
