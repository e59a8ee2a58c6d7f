//! JSON projection of a [`Record`] and its relations.
//!
//! A [`RecordResource`] borrows a fully-loaded record graph and serializes to
//!
//! ```json
//! {
//!   "id": "1",
//!   "attributes":    { "name": "...", "created_at": "...", "updated_at": "..." },
//!   "relationships": { "user_id": "9", "user_name": "...",
//!                      "video_id": "3", "video_name": "...",
//!                      "folder_id": 5, "folder_name": "..." }
//! }
//! ```
//!
//! Record, user and video ids are rendered as strings. `folder_id` keeps its
//! integer type; existing consumers depend on that asymmetry.
//!
//! Key order follows field order below and is stable across calls.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  entity::{Folder, Record, User, Video},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordResource<'a> {
  pub id:            String,
  pub attributes:    Attributes<'a>,
  pub relationships: Relationships<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attributes<'a> {
  pub name:       &'a str,
  pub created_at: &'a DateTime<Utc>,
  pub updated_at: &'a DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationships<'a> {
  pub user_id:     String,
  pub user_name:   &'a str,
  pub video_id:    String,
  pub video_name:  &'a str,
  pub folder_id:   i64,
  pub folder_name: &'a str,
}

impl<'a> TryFrom<&'a Record> for RecordResource<'a> {
  type Error = Error;

  fn try_from(record: &'a Record) -> Result<Self> {
    let missing = |relation| Error::MissingRelation {
      record_id: record.id,
      relation,
    };

    let user: &User = record.user.as_ref().ok_or_else(|| missing("user"))?;
    let video: &Video = record.video.as_ref().ok_or_else(|| missing("video"))?;
    let folder: &Folder =
      video.folder.as_ref().ok_or_else(|| missing("folder"))?;
    let folder_id = video.folder_id.ok_or_else(|| missing("folder"))?;

    Ok(Self {
      id:            record.id.to_string(),
      attributes:    Attributes {
        name:       &record.name,
        created_at: &record.created_at,
        updated_at: &record.updated_at,
      },
      relationships: Relationships {
        user_id: user.id.to_string(),
        user_name: &user.name,
        video_id: video.id.to_string(),
        video_name: &video.name,
        folder_id,
        folder_name: &folder.name,
      },
    })
  }
}

/// Project a single record.
pub fn project(record: &Record) -> Result<RecordResource<'_>> {
  RecordResource::try_from(record)
}

/// Project a slice of records, failing on the first unresolved relation.
pub fn project_all(records: &[Record]) -> Result<Vec<RecordResource<'_>>> {
  records.iter().map(project).collect()
}
