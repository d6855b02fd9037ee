//! Handlers for `/departments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/departments` | All departments, ascending by id |
//! | `POST` | `/departments` | Body: [`DepartmentUpsert`]; `id` present ⇒ update (200 / 404), absent ⇒ insert (201) |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use deptboard_core::{
  department::{Department, DepartmentUpsert},
  store::BoardStore,
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /departments`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Department>>, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let departments = store
    .list_departments()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(departments))
}

// ─── Upsert ───────────────────────────────────────────────────────────────────

/// `POST /departments` — insert or update depending on `id`.
///
/// Updates keep stored values for omitted fields; inserts apply the fixed
/// defaults. Neither path validates required fields.
pub async fn upsert<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<DepartmentUpsert>,
) -> Result<Response, ApiError>
where
  S: BoardStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match body.id {
    Some(id) => {
      let department = store
        .update_department(id, body.fields)
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?
        .ok_or_else(|| ApiError::NotFound(format!("department {id} not found")))?;
      Ok(Json(department).into_response())
    }
    None => {
      let department = store
        .insert_department(body.fields)
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      Ok((StatusCode::CREATED, Json(department)).into_response())
    }
  }
}
