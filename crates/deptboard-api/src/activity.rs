//! Handlers for `/activity-feed` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activity-feed/:department_id` | Newest first |
//! | `POST` | `/activity-feed` | Body: [`NewActivityEntry`]; returns 201 + stored entry |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use deptboard_core::{
  DepartmentId,
  activity::{ActivityEntry, NewActivityEntry},
  store::BoardStore,
};

use crate::error::ApiError;

/// `GET /activity-feed/:department_id`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(department_id): Path<DepartmentId>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries = store
    .list_activity(department_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(entries))
}

/// `POST /activity-feed`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewActivityEntry>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .record_activity(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(entry)))
}
