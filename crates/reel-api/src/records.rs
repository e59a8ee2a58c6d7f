//! Handlers for `/records` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records` | All records, by id |
//! | `POST` | `/records` | Body: [`CreateBody`]; returns 201 + the record, 422 for an unknown user or video |
//! | `GET`  | `/records/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use reel_core::{
  entity::NewRecord,
  resource,
  store::{RecordStore, StoreError as _},
};
use serde::Deserialize;

use crate::{Data, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /records`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Response, ApiError>
where
  S: RecordStore,
{
  let records = store.list_records().await.map_err(ApiError::store)?;
  let data = resource::project_all(&records)?;
  Ok(Json(Data { data }).into_response())
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:     String,
  pub user_id:  i64,
  pub video_id: i64,
}

/// `POST /records`, body: `{"name":"...","user_id":1,"video_id":2}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<Response, ApiError>
where
  S: RecordStore,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("name must not be empty".into()));
  }

  let record = store
    .add_record(NewRecord {
      name:     body.name,
      user_id:  body.user_id,
      video_id: body.video_id,
    })
    .await
    .map_err(|e| {
      if e.is_missing_reference() {
        ApiError::Unprocessable(e.to_string())
      } else {
        ApiError::store(e)
      }
    })?;
  let data = resource::project(&record)?;
  Ok((StatusCode::CREATED, Json(Data { data })).into_response())
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Response, ApiError>
where
  S: RecordStore,
{
  let record = store
    .get_record(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;
  let data = resource::project(&record)?;
  Ok(Json(Data { data }).into_response())
}
