//! End-to-end tests for the HTTP surface.
//!
//! Requests go through the full router (extractors, trace layer and
//! serialization) with `tower::ServiceExt::oneshot`; no socket is opened.

use axum::Router;
use axum::body::Body as HttpBody;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use issuelog::resource::IssueResource;
use issuelog::storage::in_memory::new_in_memory_storage;
use issuelog::storage::UnavailableStore;
use issuelog_server::config::{ServerConfig, StorageConfig};
use issuelog_server::{build_resource, router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const ISSUES: &str = "/api/issues/apitest";
const UNKNOWN_ID: &str = "5f665eb46e296f6b9b6a504d";

fn app() -> Router {
    router(IssueResource::new(new_in_memory_storage()))
}

async fn send(app: &Router, request: Request<HttpBody>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: &Value) -> Value {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(HttpBody::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

async fn send_form(app: &Router, method: Method, uri: &str, form: &str) -> Value {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(HttpBody::from(form.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let request = Request::builder().uri(uri).body(HttpBody::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

async fn create(app: &Router, title: &str) -> String {
    let created = send_json(
        app,
        Method::POST,
        ISSUES,
        &json!({"issue_title": title, "issue_text": "text", "created_by": "tester"}),
    )
    .await;
    created["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(HttpBody::empty()).unwrap();
    let (status, bytes) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"OK");
}

#[tokio::test]
async fn test_create_returns_full_record_without_project() {
    let app = app();
    let created = send_json(
        &app,
        Method::POST,
        ISSUES,
        &json!({
            "issue_title": "Faux Issue Title",
            "issue_text": "Functional Test - Every field filled in",
            "created_by": "fCC",
            "assigned_to": "Chai and Mocha",
            "status_text": "In QA",
        }),
    )
    .await;

    let record = created.as_object().unwrap();
    assert_eq!(record.len(), 9);
    assert!(!record.contains_key("project"));
    assert_eq!(created["assigned_to"], "Chai and Mocha");
    assert_eq!(created["open"], true);
    assert_eq!(created["created_on"], created["updated_on"]);
    assert_eq!(created["_id"].as_str().unwrap().len(), 24);
}

#[tokio::test]
async fn test_create_from_form_body() {
    let app = app();
    let created = send_form(
        &app,
        Method::POST,
        ISSUES,
        "issue_title=Form+issue&issue_text=sent%20as%20a%20form&created_by=browser",
    )
    .await;

    assert_eq!(created["issue_title"], "Form issue");
    assert_eq!(created["issue_text"], "sent as a form");
    assert_eq!(created["assigned_to"], "");
}

#[tokio::test]
async fn test_create_missing_fields_is_still_200() {
    let app = app();
    let reply = send_json(&app, Method::POST, ISSUES, &json!({"issue_title": "only"})).await;
    assert_eq!(reply, json!({"error": "required field(s) missing"}));
}

#[tokio::test]
async fn test_malformed_json_reads_as_empty_body() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri(ISSUES)
        .header(header::CONTENT_TYPE, "application/json")
        .body(HttpBody::from("{\"issue_title\": "))
        .unwrap();

    let (status, bytes) = send(&app, request).await;
    let reply: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, json!({"error": "required field(s) missing"}));
}

#[tokio::test]
async fn test_list_filters_by_query() {
    let app = app();
    let first = create(&app, "first").await;
    create(&app, "second").await;

    let all = get_json(&app, ISSUES).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let filtered = get_json(&app, &format!("{ISSUES}?issue_title=first&open=true")).await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["_id"], first.as_str());

    let other_project = get_json(&app, "/api/issues/elsewhere").await;
    assert_eq!(other_project, json!([]));
}

#[tokio::test]
async fn test_update_then_list_reflects_change() {
    let app = app();
    let id = create(&app, "to update").await;

    let reply = send_json(
        &app,
        Method::PUT,
        ISSUES,
        &json!({"_id": id, "status_text": "In progress", "open": false}),
    )
    .await;
    assert_eq!(reply, json!({"result": "successfully updated", "_id": id}));

    let closed = send_form(&app, Method::PUT, ISSUES, &format!("_id={id}&open=false")).await;
    assert_eq!(closed["result"], "successfully updated");

    let listed = get_json(&app, &format!("{ISSUES}?_id={id}")).await;
    assert_eq!(listed[0]["status_text"], "In progress");
    assert_eq!(listed[0]["open"], false);
}

#[tokio::test]
async fn test_update_errors() {
    let app = app();

    let missing = send_json(&app, Method::PUT, ISSUES, &json!({"issue_text": "x"})).await;
    assert_eq!(missing, json!({"error": "missing _id"}));

    let empty = send_json(&app, Method::PUT, ISSUES, &json!({"_id": UNKNOWN_ID})).await;
    assert_eq!(
        empty,
        json!({"error": "no update field(s) sent", "_id": UNKNOWN_ID})
    );

    let unknown = send_json(
        &app,
        Method::PUT,
        ISSUES,
        &json!({"_id": UNKNOWN_ID, "issue_text": "x"}),
    )
    .await;
    assert_eq!(unknown, json!({"error": "could not update", "_id": UNKNOWN_ID}));
}

#[tokio::test]
async fn test_update_is_scoped_to_project() {
    let app = app();
    let id = create(&app, "apitest only").await;

    let reply = send_json(
        &app,
        Method::PUT,
        "/api/issues/elsewhere",
        &json!({"_id": id, "issue_text": "x"}),
    )
    .await;
    assert_eq!(reply, json!({"error": "could not update", "_id": id}));
}

#[tokio::test]
async fn test_delete_lifecycle() {
    let app = app();
    let id = create(&app, "to delete").await;

    let deleted = send_json(&app, Method::DELETE, ISSUES, &json!({"_id": id})).await;
    assert_eq!(deleted, json!({"result": "successfully deleted", "_id": id}));

    let again = send_form(&app, Method::DELETE, ISSUES, &format!("_id={id}")).await;
    assert_eq!(again, json!({"error": "could not delete", "_id": id}));

    let missing = send_json(&app, Method::DELETE, ISSUES, &json!({})).await;
    assert_eq!(missing, json!({"error": "missing _id"}));
}

#[tokio::test]
async fn test_store_fault_keeps_response_shape() {
    let app = router(IssueResource::new(Box::new(UnavailableStore::new())));

    let created = send_json(
        &app,
        Method::POST,
        ISSUES,
        &json!({"issue_title": "t", "issue_text": "x", "created_by": "me"}),
    )
    .await;
    assert_eq!(created, json!({"error": "could not create"}));

    assert_eq!(get_json(&app, ISSUES).await, json!([]));
}

#[tokio::test]
async fn test_jsonl_backend_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let config = ServerConfig {
        storage: StorageConfig {
            backend: "jsonl".to_string(),
            data_file: Some(temp_dir.path().join("issues.jsonl")),
        },
        ..ServerConfig::default()
    };

    let first = router(build_resource(&config).await.unwrap());
    let id = create(&first, "persisted").await;
    drop(first);

    let second = router(build_resource(&config).await.unwrap());
    let listed = get_json(&second, &format!("{ISSUES}?_id={id}")).await;
    assert_eq!(listed[0]["issue_title"], "persisted");
}
