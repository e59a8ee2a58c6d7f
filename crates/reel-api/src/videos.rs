//! Handlers for `/videos` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/videos/:id` | The video with its metadata and folder |
//! | `PUT`  | `/videos/:id/metadata` | Body: [`VideoMetadata`]; replaces all fields |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use reel_core::{
  entity::{Video, VideoMetadata},
  store::RecordStore,
};

use crate::{Data, error::ApiError};

/// `GET /videos/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Data<Video>>, ApiError>
where
  S: RecordStore,
{
  let video = store
    .get_video(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("video {id} not found")))?;
  Ok(Json(Data { data: video }))
}

/// `PUT /videos/:id/metadata`: absent fields are cleared.
pub async fn update_metadata<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(metadata): Json<VideoMetadata>,
) -> Result<Json<Data<Video>>, ApiError>
where
  S: RecordStore,
{
  let video = store
    .update_video_metadata(id, metadata)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("video {id} not found")))?;
  Ok(Json(Data { data: video }))
}
