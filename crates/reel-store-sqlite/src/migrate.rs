//! [`Migrator`] applies [`Migration`] steps to a live SQLite database.
//!
//! Each step runs as: introspect the current schema, let the step compute
//! its target schema, then issue the DDL that turns one into the other. The
//! DDL and the ledger update share one transaction, so a failing step leaves
//! neither partial columns nor a ledger entry behind.
//!
//! Foreign-key enforcement is switched off for the duration of a step (it
//! cannot change inside a transaction) and `PRAGMA foreign_key_check` runs
//! before commit instead. Only violations the step introduced fail it; orphan
//! rows that were already in the database are left alone.

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use chrono::{DateTime, Utc};
use reel_core::{
  migration::{self, Direction, Migration},
  schema::{ColumnDef, ColumnType, DatabaseSchema, ForeignKey, TableSchema},
};
use rusqlite::Connection;

use crate::{
  Error, Result,
  encode::{decode_dt, encode_dt},
  schema::{LEDGER, LEDGER_TABLE, column_sql, create_table_sql, quote},
};

/// Prefix for the scratch table used while rebuilding a table.
const REBUILD_PREFIX: &str = "_reel_rebuild_";

/// A catalog step and, if applied, when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
  pub version:    u32,
  pub name:       &'static str,
  pub applied_at: Option<DateTime<Utc>>,
}

/// Runs migration steps against a connection and keeps the
/// `schema_migrations` ledger.
#[derive(Clone)]
pub struct Migrator {
  conn:  tokio_rusqlite::Connection,
  steps: Vec<Arc<dyn Migration>>,
}

impl Migrator {
  /// A migrator over the full [`migration::catalog`].
  pub fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self::with_steps(conn, migration::catalog())
  }

  /// A migrator over a custom set of steps; they are sorted by version.
  pub fn with_steps(
    conn: tokio_rusqlite::Connection,
    mut steps: Vec<Arc<dyn Migration>>,
  ) -> Self {
    steps.sort_by_key(|s| s.version());
    Self { conn, steps }
  }

  async fn ensure_ledger(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(LEDGER)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Applied versions and when they were applied.
  async fn applied(&self) -> Result<BTreeMap<u32, DateTime<Utc>>> {
    self.ensure_ledger().await?;

    let rows: Vec<(u32, String)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT version, applied_at FROM schema_migrations")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(version, at)| Ok((version, decode_dt(&at)?)))
      .collect()
  }

  /// Every known step with its applied timestamp, in version order.
  pub async fn status(&self) -> Result<Vec<MigrationStatus>> {
    let applied = self.applied().await?;
    Ok(
      self
        .steps
        .iter()
        .map(|step| MigrationStatus {
          version:    step.version(),
          name:       step.name(),
          applied_at: applied.get(&step.version()).copied(),
        })
        .collect(),
    )
  }

  /// Apply every pending step in version order. Returns the versions
  /// applied; stops at the first failure.
  pub async fn migrate(&self) -> Result<Vec<u32>> {
    let applied = self.applied().await?;
    let mut versions = Vec::new();

    for step in &self.steps {
      if applied.contains_key(&step.version()) {
        continue;
      }
      self.apply(step.clone(), Direction::Up).await?;
      versions.push(step.version());
    }

    if versions.is_empty() {
      tracing::debug!("schema is up to date");
    }
    Ok(versions)
  }

  /// Revert the most recently applied step. Returns its version, or `None`
  /// if nothing is applied.
  pub async fn rollback(&self) -> Result<Option<u32>> {
    let applied = self.applied().await?;
    let Some(&version) = applied.keys().next_back() else {
      return Ok(None);
    };

    let step = self
      .steps
      .iter()
      .find(|s| s.version() == version)
      .cloned()
      .ok_or(Error::UnknownMigration(version))?;

    self.apply(step, Direction::Down).await?;
    Ok(Some(version))
  }

  /// Run one step against the live schema and record it in the ledger
  /// (`Up`) or remove it from the ledger (`Down`).
  pub async fn apply(
    &self,
    step: Arc<dyn Migration>,
    direction: Direction,
  ) -> Result<()> {
    self.ensure_ledger().await?;

    let version = step.version();
    let name = step.name();

    let statements = self
      .conn
      .call(move |conn| Ok(run_step(conn, step.as_ref(), direction)))
      .await??;

    tracing::info!(version, name, ?direction, statements, "migration step applied");
    Ok(())
  }

  /// Introspect the live schema, excluding the ledger.
  pub async fn current_schema(&self) -> Result<DatabaseSchema> {
    self.conn.call(|conn| Ok(introspect(conn))).await?
  }
}

// ─── Step execution ──────────────────────────────────────────────────────────

/// Returns the number of DDL statements issued.
fn run_step(
  conn: &mut Connection,
  step: &dyn Migration,
  direction: Direction,
) -> Result<usize> {
  conn.pragma_update(None, "foreign_keys", false)?;
  let outcome = run_step_in_transaction(conn, step, direction);
  conn.pragma_update(None, "foreign_keys", true)?;
  outcome
}

fn run_step_in_transaction(
  conn: &mut Connection,
  step: &dyn Migration,
  direction: Direction,
) -> Result<usize> {
  let tx = conn.transaction()?;

  let current = introspect(&tx)?;
  let target = step.apply(&current, direction)?;
  let statements = plan(&current, &target);

  let existing = foreign_key_violations(&tx)?;
  if !existing.is_empty() {
    tracing::warn!(
      count = existing.len(),
      "database already holds foreign key violations"
    );
  }

  for sql in &statements {
    tracing::debug!(%sql, "executing");
    tx.execute_batch(sql)?;
  }
  check_foreign_keys(&tx, &existing)?;

  match direction {
    Direction::Up => tx.execute(
      "INSERT INTO schema_migrations (version, name, applied_at)
       VALUES (?1, ?2, ?3)",
      rusqlite::params![step.version(), step.name(), encode_dt(Utc::now())],
    )?,
    Direction::Down => tx.execute(
      "DELETE FROM schema_migrations WHERE version = ?1",
      rusqlite::params![step.version()],
    )?,
  };

  tx.commit()?;
  Ok(statements.len())
}

/// A `PRAGMA foreign_key_check` row: child table, child rowid, parent table.
type Violation = (String, Option<i64>, String);

fn foreign_key_violations(conn: &Connection) -> Result<BTreeSet<Violation>> {
  let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
  let violations = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
    .collect::<rusqlite::Result<_>>()?;
  Ok(violations)
}

/// Fails on the first violation not already present in `before`.
fn check_foreign_keys(conn: &Connection, before: &BTreeSet<Violation>) -> Result<()> {
  let introduced = foreign_key_violations(conn)?
    .into_iter()
    .find(|v| !before.contains(v));

  match introduced {
    Some((table, rowid, parent)) => {
      Err(Error::ForeignKeyViolation { table, rowid, parent })
    }
    None => Ok(()),
  }
}

// ─── Introspection ───────────────────────────────────────────────────────────

pub(crate) fn introspect(conn: &Connection) -> Result<DatabaseSchema> {
  let names: Vec<String> = {
    let mut stmt = conn.prepare(
      "SELECT name FROM sqlite_master
       WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != ?1
       ORDER BY name",
    )?;
    stmt
      .query_map([LEDGER_TABLE], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let mut schema = DatabaseSchema::new();
  for name in names {
    schema.insert(introspect_table(conn, &name)?);
  }
  Ok(schema)
}

fn introspect_table(conn: &Connection, table: &str) -> Result<TableSchema> {
  let mut fk_stmt = conn.prepare(
    "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1)",
  )?;
  let mut foreign_keys: BTreeMap<String, ForeignKey> = fk_stmt
    .query_map([table], |row| {
      Ok((row.get::<_, String>(0)?, ForeignKey {
        table:  row.get(1)?,
        column: row.get(2)?,
      }))
    })?
    .collect::<rusqlite::Result<_>>()?;

  let mut col_stmt = conn.prepare(
    "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
  )?;
  let raw: Vec<(String, String, bool, i64)> = col_stmt
    .query_map([table], |row| {
      Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    })?
    .collect::<rusqlite::Result<_>>()?;

  let columns = raw
    .into_iter()
    .map(|(name, declared, not_null, pk)| {
      let ty = ColumnType::from_sql(&declared).ok_or_else(|| {
        Error::UnsupportedColumnType {
          table:  table.to_owned(),
          column: name.clone(),
          declared,
        }
      })?;
      Ok(ColumnDef {
        references: foreign_keys.remove(&name),
        nullable: !not_null && pk == 0,
        primary_key: pk > 0,
        ty,
        name,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(TableSchema::new(table, columns))
}

// ─── Planning ────────────────────────────────────────────────────────────────

/// DDL that turns `current` into `target`.
pub(crate) fn plan(current: &DatabaseSchema, target: &DatabaseSchema) -> Vec<String> {
  let mut statements = Vec::new();

  for table in current.tables() {
    if !target.contains_table(&table.name) {
      statements.push(format!("DROP TABLE {}", quote(&table.name)));
    }
  }

  for table in target.tables() {
    match current.table(&table.name) {
      None => statements.push(create_table_sql(table)),
      Some(existing) if existing != table => {
        statements.extend(alter_statements(existing, table));
      }
      Some(_) => {}
    }
  }

  statements
}

fn alter_statements(from: &TableSchema, to: &TableSchema) -> Vec<String> {
  let name = quote(&to.name);
  let kept = from.columns.len();

  // Pure append of nullable columns: ADD COLUMN.
  if to.columns.len() > kept
    && to.columns[..kept] == from.columns[..]
    && to.columns[kept..].iter().all(|c| c.nullable && !c.primary_key)
  {
    return to.columns[kept..]
      .iter()
      .map(|c| format!("ALTER TABLE {name} ADD COLUMN {}", column_sql(c)))
      .collect();
  }

  // Pure removal of plain columns: DROP COLUMN.
  let removed: Vec<&ColumnDef> = from
    .columns
    .iter()
    .filter(|c| to.column(&c.name).is_none())
    .collect();
  if !removed.is_empty()
    && is_subsequence(&to.columns, &from.columns)
    && removed.iter().all(|c| !c.primary_key && c.references.is_none())
  {
    return removed
      .iter()
      .map(|c| format!("ALTER TABLE {name} DROP COLUMN {}", quote(&c.name)))
      .collect();
  }

  rebuild_statements(from, to)
}

/// Copy-and-rename rebuild, for reorders and positioned inserts.
fn rebuild_statements(from: &TableSchema, to: &TableSchema) -> Vec<String> {
  let name = quote(&to.name);
  let scratch = TableSchema::new(
    format!("{REBUILD_PREFIX}{}", to.name),
    to.columns.clone(),
  );
  let scratch_name = quote(&scratch.name);

  let shared = to
    .columns
    .iter()
    .filter(|c| from.column(&c.name).is_some())
    .map(|c| quote(&c.name))
    .collect::<Vec<_>>()
    .join(", ");

  let mut statements = vec![create_table_sql(&scratch)];
  if !shared.is_empty() {
    statements.push(format!(
      "INSERT INTO {scratch_name} ({shared}) SELECT {shared} FROM {name}"
    ));
  }
  statements.push(format!("DROP TABLE {name}"));
  statements.push(format!("ALTER TABLE {scratch_name} RENAME TO {name}"));
  statements
}

fn is_subsequence(sub: &[ColumnDef], of: &[ColumnDef]) -> bool {
  let mut rest = of.iter();
  sub.iter().all(|c| rest.any(|o| o == c))
}
