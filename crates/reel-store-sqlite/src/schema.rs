//! SQL for the Reel SQLite store: connection setup, the migration ledger, and
//! DDL rendering for [`TableSchema`] values.
//!
//! Catalog tables themselves are not written out here; they come from the
//! [`reel_core::migration`] steps.

use reel_core::schema::{ColumnDef, TableSchema};

/// Executed on every new connection.
pub const CONNECTION_PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

pub const LEDGER_TABLE: &str = "schema_migrations";

/// The ledger of applied migration steps; idempotent.
pub const LEDGER: &str = "
CREATE TABLE IF NOT EXISTS schema_migrations (
    version     INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    applied_at  TEXT NOT NULL    -- RFC 3339 UTC
);
";

/// Quote an identifier for use in SQL.
pub fn quote(ident: &str) -> String { format!("\"{}\"", ident.replace('"', "\"\"")) }

pub fn column_sql(column: &ColumnDef) -> String {
  let mut sql = format!("{} {}", quote(&column.name), column.ty.sql());
  if column.primary_key {
    sql.push_str(" PRIMARY KEY");
  } else if !column.nullable {
    sql.push_str(" NOT NULL");
  }
  if let Some(fk) = &column.references {
    sql.push_str(" REFERENCES ");
    sql.push_str(&quote(&fk.table));
    if let Some(parent) = &fk.column {
      sql.push_str(&format!(" ({})", quote(parent)));
    }
  }
  sql
}

pub fn create_table_sql(table: &TableSchema) -> String {
  let columns = table
    .columns
    .iter()
    .map(column_sql)
    .collect::<Vec<_>>()
    .join(",\n    ");
  format!("CREATE TABLE {} (\n    {columns}\n)", quote(&table.name))
}
