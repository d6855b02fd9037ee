//! JSON REST API for deptboard.
//!
//! Exposes an axum [`Router`] backed by any [`deptboard_core::store::BoardStore`].
//! Auth, TLS, and static hosting are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", deptboard_api::api_router(store.clone()))
//! ```

pub mod activity;
pub mod departments;
pub mod error;
pub mod forum;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use deptboard_core::store::BoardStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: BoardStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Departments
    .route(
      "/departments",
      get(departments::list::<S>).post(departments::upsert::<S>),
    )
    // Activity feed
    .route("/activity-feed", post(activity::create::<S>))
    .route("/activity-feed/{department_id}", get(activity::list::<S>))
    // Forum
    .route("/forum/topics", post(forum::create_topic::<S>))
    .route("/forum/topics/{node}", get(forum::list_topics::<S>))
    .route("/forum/replies", post(forum::create_reply::<S>))
    .route("/forum/replies/{topic_id}", get(forum::list_replies::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use deptboard_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
  }

  async fn department_id(app: &Router, name: &str) -> i64 {
    let (_, depts) = send(app, "GET", "/departments", None).await;
    depts
      .as_array()
      .unwrap()
      .iter()
      .find(|d| d["name"] == name)
      .and_then(|d| d["id"].as_i64())
      .unwrap()
  }

  // ── Departments ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_departments_returns_seed_ascending() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/departments", None).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0]["name"], "SALES");
    assert_eq!(rows[7]["name"], "CULTURE");
    let ids: Vec<_> = rows.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
  }

  #[tokio::test]
  async fn post_without_id_creates_with_defaults() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/departments",
      Some(json!({ "id": null, "name": "LEGAL", "hod_name": "Jane Doe" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "LEGAL");
    assert_eq!(body["status_update"], "v1.0.0");
    assert_eq!(body["is_visible"], true);
    assert_eq!(body["percent_complete"], 0);
    assert!(body["id"].as_i64().unwrap() > 8);
  }

  #[tokio::test]
  async fn post_with_id_updates_and_keeps_omitted_fields() {
    let app = app().await;
    let id = department_id(&app, "FINANCE").await;

    let (_, first) = send(
      &app,
      "POST",
      "/departments",
      Some(json!({ "id": id, "hod_name": "Sam", "percent_complete": 30 })),
    )
    .await;

    let (status, second) = send(
      &app,
      "POST",
      "/departments",
      Some(json!({ "id": id.to_string(), "status_update": "v1.4.0" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["name"], "FINANCE");
    assert_eq!(second["hod_name"], "Sam");
    assert_eq!(second["percent_complete"], 30);
    assert_eq!(second["status_update"], "v1.4.0");
    assert!(
      second["last_updated"].as_str().unwrap() > first["last_updated"].as_str().unwrap()
    );
  }

  #[tokio::test]
  async fn post_with_unknown_id_is_404() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/departments",
      Some(json!({ "id": 777, "name": "GHOST" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn missing_required_field_is_generic_500() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/departments", Some(json!({ "hod_name": "x" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Server error" }));
  }

  #[tokio::test]
  async fn duplicate_name_is_generic_500() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/departments", Some(json!({ "name": "IT" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server error");
  }

  // ── Activity feed ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn activity_roundtrip_newest_first() {
    let app = app().await;
    let id = department_id(&app, "IT").await;

    for (content, pinned) in [("patch rollout", true), ("need laptops", false)] {
      let (status, _) = send(
        &app,
        "POST",
        "/activity-feed",
        Some(json!({
          "dept_metadata_id": id,
          "author_id": 1,
          "content_en": content,
          "content_cn": content,
          "is_pinned": pinned,
        })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, feed) = send(&app, "GET", &format!("/activity-feed/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["content_en"], "need laptops");
    assert_eq!(feed[0]["kind"], "REQUEST");
    assert_eq!(feed[1]["kind"], "SYSTEM_UPDATE");
    assert_eq!(feed[1]["is_pinned"], true);
  }

  #[tokio::test]
  async fn activity_for_unknown_department_is_500() {
    let app = app().await;
    let (status, _) = send(
      &app,
      "POST",
      "/activity-feed",
      Some(json!({ "dept_metadata_id": 999, "content_en": "?" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }

  // ── Forum ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn topics_are_scoped_to_their_node() {
    let app = app().await;

    let (status, created) = send(
      &app,
      "POST",
      "/forum/topics",
      Some(json!({
        "dept_name": "SALES",
        "author_name": "Admin User",
        "title": "Pipeline",
        "content": "Review",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["dept_name"], "SALES");

    let (_, sales) = send(&app, "GET", "/forum/topics/SALES", None).await;
    assert_eq!(sales.as_array().unwrap().len(), 1);
    assert_eq!(sales[0]["id"], created["id"]);

    let (_, global) = send(&app, "GET", "/forum/topics/GLOBAL", None).await;
    assert!(global.as_array().unwrap().is_empty());

    let (_, it) = send(&app, "GET", "/forum/topics/IT", None).await;
    assert!(it.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn node_keys_are_percent_decoded() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/forum/topics/O%26M", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_node_is_404() {
    let app = app().await;
    let (status, _) = send(&app, "GET", "/forum/topics/MARKETING", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
      &app,
      "POST",
      "/forum/topics",
      Some(json!({ "dept_name": "MARKETING", "author_name": "a", "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn replies_roundtrip_oldest_first() {
    let app = app().await;
    let (_, topic) = send(
      &app,
      "POST",
      "/forum/topics",
      Some(json!({
        "dept_name": "GLOBAL",
        "author_name": "System Designer",
        "title": "Welcome",
        "content": "Say hi",
      })),
    )
    .await;
    let topic_id = topic["id"].as_i64().unwrap();

    for content in ["hi", "hello"] {
      let (status, _) = send(
        &app,
        "POST",
        "/forum/replies",
        Some(json!({
          "topic_id": topic_id.to_string(),
          "author_name": "HoD User",
          "content": content,
        })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (status, replies) =
      send(&app, "GET", &format!("/forum/replies/{topic_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<_> = replies
      .as_array()
      .unwrap()
      .iter()
      .map(|r| r["content"].as_str().unwrap())
      .collect();
    assert_eq!(contents, ["hi", "hello"]);
  }
}
