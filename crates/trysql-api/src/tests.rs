//! Router tests against a real SQLite store in a temporary directory.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use chrono::{TimeDelta, Utc};
use serde_json::{Value as Json, json};
use tempfile::TempDir;
use tower::ServiceExt as _;
use trysql_core::{PublicId, TenantStore};
use trysql_store_sqlite::SqliteTenants;

use crate::{AppState, api_router};

async fn make_state() -> (TempDir, AppState<SqliteTenants>) {
  let dir = tempfile::tempdir().unwrap();
  let store = SqliteTenants::open(dir.path()).await.unwrap();
  let state = AppState { store: Arc::new(store), retention: TimeDelta::days(1) };
  (dir, state)
}

async fn send(
  state:  &AppState<SqliteTenants>,
  method: &str,
  uri:    &str,
  body:   Option<Json>,
) -> (StatusCode, Json) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp: Response = api_router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Json::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

async fn new_database(state: &AppState<SqliteTenants>) -> String {
  let (status, body) = send(state, "POST", "/api/new", None).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  body["databaseId"].as_str().unwrap().to_owned()
}

async fn query(
  state: &AppState<SqliteTenants>,
  id:    &str,
  sql:   &str,
) -> (StatusCode, Json) {
  send(state, "POST", "/api", Some(json!({ "databaseId": id, "query": sql }))).await
}

// ── POST /api/new ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_returns_a_five_letter_id() {
  let (_dir, state) = make_state().await;
  let id = new_database(&state).await;
  assert_eq!(id.len(), 5);
  assert!(state.store.exists(PublicId::parse(&id).unwrap()).await.unwrap());
}

#[tokio::test]
async fn new_sweeps_stale_databases_first() {
  let (dir, state) = make_state().await;
  let orphan = dir.path().join("user_orphA.sqlite");
  std::fs::write(&orphan, b"").unwrap();

  let old = new_database(&state).await;
  let old_id = PublicId::parse(&old).unwrap();
  // Rewind the clock by sweeping with a cutoff in the future.
  state
    .store
    .reaper()
    .sweep_before(Utc::now() + TimeDelta::seconds(1))
    .await
    .unwrap();
  assert!(!state.store.exists(old_id).await.unwrap());
  assert!(!orphan.exists());

  std::fs::write(&orphan, b"").unwrap();
  new_database(&state).await;
  assert!(!orphan.exists());
}

#[tokio::test]
async fn new_succeeds_when_the_sweep_fails() {
  let (dir, mut state) = make_state().await;
  state.retention = TimeDelta::zero();
  let stale = new_database(&state).await;
  // A directory where the stale tenant's file should be cannot be unlinked.
  std::fs::create_dir(dir.path().join(format!("user_{stale}.sqlite"))).unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(10)).await;

  let stale_id = PublicId::parse(&stale).unwrap();
  assert!(state.store.sweep(state.retention).await.is_err());

  let (status, body) = send(&state, "POST", "/api/new", None).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  let fresh = body["databaseId"].as_str().unwrap();
  assert_eq!(fresh.len(), 5);
  assert!(state.store.exists(PublicId::parse(fresh).unwrap()).await.unwrap());
  // The aborted sweep left the stale entry in place.
  assert!(state.store.exists(stale_id).await.unwrap());
}

// ── GET /api ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn describe_requires_database_id() {
  let (_dir, state) = make_state().await;
  let (status, body) = send(&state, "GET", "/api", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "Missing databaseId query parameter");

  let (status, _) = send(&state, "GET", "/api?databaseId=", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn describe_unknown_database_is_404() {
  let (_dir, state) = make_state().await;
  let (status, body) = send(&state, "GET", "/api?databaseId=nopeX", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["error"], "Database not found");
}

#[tokio::test]
async fn describe_empty_database() {
  let (_dir, state) = make_state().await;
  let id = new_database(&state).await;
  let (status, body) = send(&state, "GET", &format!("/api?databaseId={id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "tables": [] }));
}

// ── POST /api ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_insert_describe_round() {
  let (_dir, state) = make_state().await;
  let id = new_database(&state).await;

  let (status, body) = query(&state, &id, "CREATE TABLE t(a INTEGER, b TEXT)").await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert!(body["executionTime"].is_u64());
  assert_eq!(body["results"]["columns"], json!([]));
  assert_eq!(body["results"]["rowCount"], 0);

  let (status, _) = query(&state, &id, "INSERT INTO t VALUES (1,'x')").await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = send(&state, "GET", &format!("/api?databaseId={id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    body,
    json!({ "tables": [{ "name": "t", "columns": ["a", "b"], "rows": [[1, "x"]] }] })
  );
}

#[tokio::test]
async fn select_reports_counts_and_native_types() {
  let (_dir, state) = make_state().await;
  let id = new_database(&state).await;

  let (status, body) = query(&state, &id, "SELECT 1 AS n, 2.5 AS r, 'hi' AS s, NULL AS z").await;
  assert_eq!(status, StatusCode::OK, "{body}");
  let results = &body["results"];
  assert_eq!(results["name"], "QueryResult");
  assert_eq!(results["columns"], json!(["n", "r", "s", "z"]));
  assert_eq!(results["columnCount"], 4);
  assert_eq!(results["rowCount"], 1);
  assert_eq!(results["rows"], json!([[1, 2.5, "hi", null]]));
  assert!(results["rows"][0][0].is_i64());
}

#[tokio::test]
async fn malformed_sql_is_400_with_execution_time() {
  let (_dir, state) = make_state().await;
  let id = new_database(&state).await;

  let (status, body) = query(&state, &id, "SELEKT * FROM t").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["executionTime"].is_u64());
  assert!(body["error"].as_str().unwrap().contains("syntax error"), "{body}");
  assert!(body.get("results").is_none());
}

#[tokio::test]
async fn unreadable_tenant_file_is_500() {
  let (dir, state) = make_state().await;
  let id = new_database(&state).await;
  std::fs::write(dir.path().join(format!("user_{id}.sqlite")), "not a database ".repeat(64))
    .unwrap();

  let (status, body) = query(&state, &id, "SELECT * FROM sqlite_master").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
  assert!(body.get("executionTime").is_none());
  assert!(body["error"].is_string());

  let (status, _) = send(&state, "GET", &format!("/api?databaseId={id}"), None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn query_on_unknown_database_fails_freshness_update() {
  let (dir, state) = make_state().await;
  let (status, body) = query(&state, "ghost", "SELECT 1").await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["error"], "Failed to update last queried time");
  // No tenant file is created for an unregistered id.
  assert!(!dir.path().join("user_ghost.sqlite").exists());
}

#[tokio::test]
async fn invalid_query_body_is_400() {
  let (_dir, state) = make_state().await;
  for body in [json!({ "query": "SELECT 1" }), json!({ "databaseId": "../x", "query": "SELECT 1" })] {
    let (status, resp) = send(&state, "POST", "/api", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Invalid request body");
  }
}

// ── POST /api/reset ───────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_drops_the_database() {
  let (dir, state) = make_state().await;
  let id = new_database(&state).await;
  query(&state, &id, "CREATE TABLE t(a)").await;
  assert!(dir.path().join(format!("user_{id}.sqlite")).exists());

  let (status, body) = send(&state, "POST", "/api/reset", Some(json!({ "databaseId": id.as_str() }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Database reset successfully");
  assert!(!dir.path().join(format!("user_{id}.sqlite")).exists());

  let (status, _) = send(&state, "GET", &format!("/api?databaseId={id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_unknown_database_is_404() {
  let (_dir, state) = make_state().await;
  let (status, _) = send(&state, "POST", "/api/reset", Some(json!({ "databaseId": "ghost" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&state, "POST", "/api/reset", Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
