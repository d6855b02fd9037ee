//! Handlers for `/forum` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/forum/topics/:node` | `GLOBAL` or a department name; newest first; 404 for an unknown node |
//! | `POST` | `/forum/topics` | Body: [`NewForumTopic`]; returns 201 + stored topic |
//! | `GET`  | `/forum/replies/:topic_id` | Oldest first |
//! | `POST` | `/forum/replies` | Body: [`NewForumReply`]; returns 201 + stored reply |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use deptboard_core::{
  TopicId,
  forum::{ForumNode, ForumReply, ForumTopic, NewForumReply, NewForumTopic},
  store::BoardStore,
};

use crate::error::ApiError;

async fn resolve<S>(store: &S, key: &str) -> Result<ForumNode, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .resolve_node(key.to_owned())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("forum node {key:?} not found")))
}

// ─── Topics ───────────────────────────────────────────────────────────────────

/// `GET /forum/topics/:node`
pub async fn list_topics<S>(
  State(store): State<Arc<S>>,
  Path(key): Path<String>,
) -> Result<Json<Vec<ForumTopic>>, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let node = resolve(store.as_ref(), &key).await?;
  let topics = store
    .list_topics(node)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(topics))
}

/// `POST /forum/topics`
pub async fn create_topic<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewForumTopic>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let key = body.dept_name.clone().unwrap_or_default();
  let node = resolve(store.as_ref(), &key).await?;
  let topic = store
    .create_topic(node, body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(topic)))
}

// ─── Replies ──────────────────────────────────────────────────────────────────

/// `GET /forum/replies/:topic_id`
pub async fn list_replies<S>(
  State(store): State<Arc<S>>,
  Path(topic_id): Path<TopicId>,
) -> Result<Json<Vec<ForumReply>>, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let replies = store
    .list_replies(topic_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(replies))
}

/// `POST /forum/replies`
pub async fn create_reply<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewForumReply>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let reply = store
    .add_reply(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(reply)))
}
