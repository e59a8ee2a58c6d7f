//! Catalog entities as loaded by a [`RecordStore`](crate::store::RecordStore).
//!
//! Relations are optional on the loaded types: the store fills them in with
//! joins, and a row whose related entity is gone simply carries `None`. The
//! projection in [`crate::resource`] is where their presence is enforced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named folder grouping videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:   i64,
  pub name: String,
}

/// Optional descriptive columns added to `videos` by
/// [`AddVideoMetadata`](crate::migration::AddVideoMetadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
  /// Sortable integer form of `date`, e.g. `20240728`.
  pub date_raw:   Option<i64>,
  pub title:      Option<String>,
  /// Length in seconds.
  pub duration:   Option<i64>,
  pub episode:    Option<i64>,
  pub season:     Option<i64>,
  pub view_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
  pub id:        i64,
  pub name:      String,
  pub date:      Option<String>,
  pub folder_id: Option<i64>,
  #[serde(flatten)]
  pub metadata:  VideoMetadata,
  /// The folder row referenced by `folder_id`, when it was loaded.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub folder:    Option<Folder>,
}

/// The entity exposed through [`RecordResource`](crate::resource::RecordResource).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
  pub id:         i64,
  pub name:       String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub user:       Option<User>,
  pub video:      Option<Video>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input for [`RecordStore::add_video`](crate::store::RecordStore::add_video).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVideo {
  pub name:      String,
  pub date:      Option<String>,
  pub folder_id: Option<i64>,
  #[serde(flatten)]
  pub metadata:  VideoMetadata,
}

/// Input for [`RecordStore::add_record`](crate::store::RecordStore::add_record).
/// Timestamps are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecord {
  pub name:     String,
  pub user_id:  i64,
  pub video_id: i64,
}
