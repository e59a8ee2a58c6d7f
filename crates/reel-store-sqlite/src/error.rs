//! Error type for `reel-store-sqlite`.

use reel_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] reel_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Introspection found a column type the schema model cannot express.
  #[error("unsupported column type {declared:?} for {table}.{column}")]
  UnsupportedColumnType {
    table:    String,
    column:   String,
    declared: String,
  },

  /// A migration step left a row pointing at a missing parent.
  #[error("foreign key violation in {table} (rowid {rowid:?}) referencing {parent}")]
  ForeignKeyViolation {
    table:  String,
    rowid:  Option<i64>,
    parent: String,
  },

  /// The ledger names a version that no known migration carries.
  #[error("ledger references unknown migration version {0}")]
  UnknownMigration(u32),

  #[error("folder not found: {0}")]
  FolderNotFound(i64),

  #[error("user not found: {0}")]
  UserNotFound(i64),

  #[error("video not found: {0}")]
  VideoNotFound(i64),

  #[error("record not found: {0}")]
  RecordNotFound(i64),
}

impl StoreError for Error {
  fn is_missing_reference(&self) -> bool {
    matches!(
      self,
      Error::FolderNotFound(_) | Error::UserNotFound(_) | Error::VideoNotFound(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
