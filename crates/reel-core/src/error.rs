//! Error types for `reel-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A record was projected before one of its relations was loaded.
  #[error("record {record_id} has no resolved {relation}")]
  MissingRelation {
    record_id: i64,
    relation:  &'static str,
  },

  #[error("schema conflict: {0}")]
  SchemaConflict(#[from] SchemaConflict),
}

/// Why a migration step could not be applied to a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaConflict {
  #[error("table {0:?} does not exist")]
  TableMissing(String),

  #[error("table {0:?} already exists")]
  TableExists(String),

  #[error("column {table}.{column} already exists")]
  ColumnExists { table: String, column: String },

  #[error("column {table}.{column} does not exist")]
  ColumnMissing { table: String, column: String },

  /// A positioned column referred to an anchor that is not in the table.
  #[error("cannot place column after {table}.{column}: no such column")]
  AnchorMissing { table: String, column: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
