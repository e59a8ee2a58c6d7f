//! Encoding and decoding helpers between Rust domain types and the values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Relations come from `LEFT
//! JOIN`s, so every joined column is read as `Option` and a relation is only
//! materialised when its key and name are both present.

use chrono::{DateTime, Utc};
use reel_core::entity::{Folder, Record, User, Video, VideoMetadata};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column lists ────────────────────────────────────────────────────────────

/// Video columns (alias `v`) followed by its folder (alias `f`); read with
/// [`RawVideo::read`].
pub const VIDEO_COLUMNS: &str = "v.id, v.name, v.date, v.folder_id,
   v.date_raw, v.title, v.duration, v.episode, v.season, v.view_count,
   f.id, f.name";

/// Record columns (alias `r`), the user (alias `u`), then [`VIDEO_COLUMNS`].
pub const RECORD_COLUMNS: &str = "r.id, r.name, r.created_at, r.updated_at,
   u.id, u.name";

const RECORD_COLUMN_COUNT: usize = 6;

/// `SELECT` body for fully-loaded records; append a `WHERE`/`ORDER BY`.
pub fn record_select() -> String {
  format!(
    "SELECT {RECORD_COLUMNS}, {VIDEO_COLUMNS}
     FROM records r
     LEFT JOIN users   u ON u.id = r.user_id
     LEFT JOIN videos  v ON v.id = r.video_id
     LEFT JOIN folders f ON f.id = v.folder_id"
  )
}

/// `SELECT` body for a video with its folder; append a `WHERE`.
pub fn video_select() -> String {
  format!(
    "SELECT {VIDEO_COLUMNS}
     FROM videos v
     LEFT JOIN folders f ON f.id = v.folder_id"
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values for a video and its folder, all nullable because the video
/// itself may come from an outer join.
pub struct RawVideo {
  pub id:          Option<i64>,
  pub name:        Option<String>,
  pub date:        Option<String>,
  pub folder_id:   Option<i64>,
  pub metadata:    VideoMetadata,
  pub folder_pk:   Option<i64>,
  pub folder_name: Option<String>,
}

impl RawVideo {
  /// Read [`VIDEO_COLUMNS`] starting at column `at`.
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(at)?,
      name:        row.get(at + 1)?,
      date:        row.get(at + 2)?,
      folder_id:   row.get(at + 3)?,
      metadata:    VideoMetadata {
        date_raw:   row.get(at + 4)?,
        title:      row.get(at + 5)?,
        duration:   row.get(at + 6)?,
        episode:    row.get(at + 7)?,
        season:     row.get(at + 8)?,
        view_count: row.get(at + 9)?,
      },
      folder_pk:   row.get(at + 10)?,
      folder_name: row.get(at + 11)?,
    })
  }

  pub fn into_video(self) -> Option<Video> {
    let folder = match (self.folder_pk, self.folder_name) {
      (Some(id), Some(name)) => Some(Folder { id, name }),
      _ => None,
    };
    Some(Video {
      id: self.id?,
      name: self.name?,
      date: self.date,
      folder_id: self.folder_id,
      metadata: self.metadata,
      folder,
    })
  }
}

/// Raw values read by [`record_select`].
pub struct RawRecord {
  pub id:         i64,
  pub name:       String,
  pub created_at: String,
  pub updated_at: String,
  pub user_id:    Option<i64>,
  pub user_name:  Option<String>,
  pub video:      RawVideo,
}

impl RawRecord {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      created_at: row.get(2)?,
      updated_at: row.get(3)?,
      user_id:    row.get(4)?,
      user_name:  row.get(5)?,
      video:      RawVideo::read(row, RECORD_COLUMN_COUNT)?,
    })
  }

  pub fn into_record(self) -> Result<Record> {
    let user = match (self.user_id, self.user_name) {
      (Some(id), Some(name)) => Some(User { id, name }),
      _ => None,
    };
    Ok(Record {
      id: self.id,
      name: self.name,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      user,
      video: self.video.into_video(),
    })
  }
}
