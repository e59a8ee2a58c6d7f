//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use reel_core::{
  entity::{Folder, NewRecord, NewVideo, Record, User, Video, VideoMetadata},
  store::RecordStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawRecord, RawVideo, encode_dt, record_select, video_select},
  migrate::Migrator,
  schema::CONNECTION_PRAGMAS,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Reel catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and apply pending migrations.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let store = Self::connect(path).await?;
    store.migrator().migrate().await?;
    Ok(store)
  }

  /// Open a fully-migrated in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let store = Self::connect_in_memory().await?;
    store.migrator().migrate().await?;
    Ok(store)
  }

  /// Open (or create) a store at `path` without touching its schema. Used by
  /// the migration commands.
  pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_connection().await?;
    Ok(store)
  }

  pub async fn connect_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_connection().await?;
    Ok(store)
  }

  /// A [`Migrator`] over this store's connection and the full catalog.
  pub fn migrator(&self) -> Migrator { Migrator::new(self.conn.clone()) }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_connection(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(CONNECTION_PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn add_folder(&self, name: String) -> Result<Folder> {
    let insert_name = name.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO folders (name) VALUES (?1)",
          rusqlite::params![insert_name],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Folder { id, name })
  }

  async fn add_user(&self, name: String) -> Result<User> {
    let insert_name = name.clone();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (name) VALUES (?1)",
          rusqlite::params![insert_name],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User { id, name })
  }

  async fn add_video(&self, input: NewVideo) -> Result<Video> {
    let id: Result<i64> = self
      .conn
      .call(move |conn| {
        if let Some(folder_id) = input.folder_id {
          let exists = conn
            .query_row(
              "SELECT 1 FROM folders WHERE id = ?1",
              rusqlite::params![folder_id],
              |_| Ok(()),
            )
            .optional()?
            .is_some();
          if !exists {
            return Ok(Err(Error::FolderNotFound(folder_id)));
          }
        }

        let m = input.metadata;
        conn.execute(
          "INSERT INTO videos (
             name, date, folder_id,
             date_raw, title, duration, episode, season, view_count
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            input.name,
            input.date,
            input.folder_id,
            m.date_raw,
            m.title,
            m.duration,
            m.episode,
            m.season,
            m.view_count,
          ],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await?;
    let id = id?;

    self.get_video(id).await?.ok_or(Error::VideoNotFound(id))
  }

  async fn get_video(&self, id: i64) -> Result<Option<Video>> {
    let raw: Option<RawVideo> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{} WHERE v.id = ?1", video_select()),
              rusqlite::params![id],
              |row| RawVideo::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(raw.and_then(RawVideo::into_video))
  }

  async fn update_video_metadata(
    &self,
    id: i64,
    metadata: VideoMetadata,
  ) -> Result<Option<Video>> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE videos SET
             date_raw = ?2, title = ?3, duration = ?4,
             episode = ?5, season = ?6, view_count = ?7
           WHERE id = ?1",
          rusqlite::params![
            id,
            metadata.date_raw,
            metadata.title,
            metadata.duration,
            metadata.episode,
            metadata.season,
            metadata.view_count,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_video(id).await
  }

  // ── Records ───────────────────────────────────────────────────────────────

  async fn add_record(&self, input: NewRecord) -> Result<Record> {
    let now = encode_dt(Utc::now());

    let id: Result<i64> = self
      .conn
      .call(move |conn| {
        let exists = |sql: &str, id: i64| -> rusqlite::Result<bool> {
          Ok(
            conn
              .query_row(sql, rusqlite::params![id], |_| Ok(()))
              .optional()?
              .is_some(),
          )
        };
        if !exists("SELECT 1 FROM users WHERE id = ?1", input.user_id)? {
          return Ok(Err(Error::UserNotFound(input.user_id)));
        }
        if !exists("SELECT 1 FROM videos WHERE id = ?1", input.video_id)? {
          return Ok(Err(Error::VideoNotFound(input.video_id)));
        }

        conn.execute(
          "INSERT INTO records (name, user_id, video_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![input.name, input.user_id, input.video_id, now],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await?;
    let id = id?;

    self.get_record(id).await?.ok_or(Error::RecordNotFound(id))
  }

  async fn get_record(&self, id: i64) -> Result<Option<Record>> {
    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{} WHERE r.id = ?1", record_select()),
              rusqlite::params![id],
              RawRecord::read,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn list_records(&self) -> Result<Vec<Record>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!("{} ORDER BY r.id", record_select()))?;
        let rows = stmt
          .query_map([], RawRecord::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}
