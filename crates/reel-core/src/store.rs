//! The `RecordStore` trait.
//!
//! Implemented by storage backends (e.g. `reel-store-sqlite`). The API layer
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::entity::{Folder, NewRecord, NewVideo, Record, User, Video, VideoMetadata};

/// Errors a [`RecordStore`] reports.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The input named a folder, user or video that does not exist.
  fn is_missing_reference(&self) -> bool;
}

/// Abstraction over a Reel catalog backend.
///
/// Reads return records with their user, video and the video's folder
/// eager-loaded, ready for [`crate::resource::project`]. A relation whose
/// row is absent is returned as `None` rather than as an error.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: StoreError;

  // ── Catalog ───────────────────────────────────────────────────────────

  fn add_folder(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Folder, Self::Error>> + Send + '_;

  fn add_user(
    &self,
    name: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn add_video(
    &self,
    input: NewVideo,
  ) -> impl Future<Output = Result<Video, Self::Error>> + Send + '_;

  /// Retrieve a video and its folder. Returns `None` if not found.
  fn get_video(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  /// Overwrite every metadata column of a video. Returns `None` if the video
  /// does not exist.
  fn update_video_metadata(
    &self,
    id: i64,
    metadata: VideoMetadata,
  ) -> impl Future<Output = Result<Option<Video>, Self::Error>> + Send + '_;

  // ── Records ───────────────────────────────────────────────────────────

  /// Persist a new record; `created_at` and `updated_at` are set by the
  /// store. Returns the record with its relations loaded. An unknown user or
  /// video fails with an error whose
  /// [`is_missing_reference`](StoreError::is_missing_reference) is true.
  fn add_record(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  fn get_record(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// All records ordered by id.
  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;
}
