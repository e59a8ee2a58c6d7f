//! An explicit, storage-agnostic description of a database schema.
//!
//! Migrations are written as pure functions from one [`DatabaseSchema`] to
//! the next. Every operation here works on a copy: on error the input is
//! untouched and no partially-changed schema escapes.

use std::collections::BTreeMap;

use crate::{Result, SchemaConflict};

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Column storage types understood by the migration runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  Text,
  /// An RFC 3339 timestamp stored as text.
  Timestamp,
}

impl ColumnType {
  /// The SQL type name used in DDL.
  pub fn sql(self) -> &'static str {
    match self {
      ColumnType::Integer => "INTEGER",
      ColumnType::Text => "TEXT",
      ColumnType::Timestamp => "TIMESTAMP",
    }
  }

  /// Parse a declared SQL type back into a [`ColumnType`].
  pub fn from_sql(declared: &str) -> Option<Self> {
    match declared.trim().to_ascii_uppercase().as_str() {
      "INTEGER" => Some(ColumnType::Integer),
      "TEXT" => Some(ColumnType::Text),
      "TIMESTAMP" => Some(ColumnType::Timestamp),
      _ => None,
    }
  }
}

/// A foreign-key reference from a column to `table(column)`.
///
/// `column` is `None` when the reference targets the parent's primary key
/// implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
  pub table:  String,
  pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
  pub name:        String,
  pub ty:          ColumnType,
  pub nullable:    bool,
  pub primary_key: bool,
  pub references:  Option<ForeignKey>,
}

impl ColumnDef {
  /// A `NOT NULL` column of type `ty`.
  pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
    Self {
      name: name.into(),
      ty,
      nullable: false,
      primary_key: false,
      references: None,
    }
  }

  pub fn integer(name: impl Into<String>) -> Self {
    Self::new(name, ColumnType::Integer)
  }

  pub fn text(name: impl Into<String>) -> Self { Self::new(name, ColumnType::Text) }

  pub fn timestamp(name: impl Into<String>) -> Self {
    Self::new(name, ColumnType::Timestamp)
  }

  pub fn nullable(mut self) -> Self {
    self.nullable = true;
    self
  }

  pub fn primary_key(mut self) -> Self {
    self.primary_key = true;
    self.nullable = false;
    self
  }

  pub fn references(
    mut self,
    table: impl Into<String>,
    column: impl Into<String>,
  ) -> Self {
    self.references = Some(ForeignKey {
      table:  table.into(),
      column: Some(column.into()),
    });
    self
  }
}

// ─── Tables ──────────────────────────────────────────────────────────────────

/// A table and its columns, in storage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
  pub name:    String,
  pub columns: Vec<ColumnDef>,
}

impl TableSchema {
  pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
    Self { name: name.into(), columns }
  }

  pub fn column(&self, name: &str) -> Option<&ColumnDef> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn position(&self, name: &str) -> Option<usize> {
    self.columns.iter().position(|c| c.name == name)
  }

  pub fn column_names(&self) -> Vec<&str> {
    self.columns.iter().map(|c| c.name.as_str()).collect()
  }
}

/// Where [`ColumnChange::Add`] places a new column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
  /// After the last column.
  Append,
  /// Immediately after the named column.
  After(String),
}

/// One step of an [`AlterTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
  Add { column: ColumnDef, placement: Placement },
  Drop(String),
}

/// A sequence of column changes applied to one table, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterTable {
  pub table:   String,
  pub changes: Vec<ColumnChange>,
}

impl AlterTable {
  pub fn new(table: impl Into<String>) -> Self {
    Self { table: table.into(), changes: Vec::new() }
  }

  pub fn add_column(mut self, column: ColumnDef) -> Self {
    self.changes.push(ColumnChange::Add { column, placement: Placement::Append });
    self
  }

  pub fn add_column_after(
    mut self,
    column: ColumnDef,
    anchor: impl Into<String>,
  ) -> Self {
    self.changes.push(ColumnChange::Add {
      column,
      placement: Placement::After(anchor.into()),
    });
    self
  }

  pub fn drop_column(mut self, name: impl Into<String>) -> Self {
    self.changes.push(ColumnChange::Drop(name.into()));
    self
  }

  fn apply_to(&self, table: &mut TableSchema) -> Result<(), SchemaConflict> {
    for change in &self.changes {
      match change {
        ColumnChange::Add { column, placement } => {
          if table.column(&column.name).is_some() {
            return Err(SchemaConflict::ColumnExists {
              table:  table.name.clone(),
              column: column.name.clone(),
            });
          }
          let index = match placement {
            Placement::Append => table.columns.len(),
            Placement::After(anchor) => {
              table.position(anchor).ok_or_else(|| SchemaConflict::AnchorMissing {
                table:  table.name.clone(),
                column: anchor.clone(),
              })? + 1
            }
          };
          table.columns.insert(index, column.clone());
        }
        ColumnChange::Drop(name) => {
          let index =
            table.position(name).ok_or_else(|| SchemaConflict::ColumnMissing {
              table:  table.name.clone(),
              column: name.clone(),
            })?;
          table.columns.remove(index);
        }
      }
    }
    Ok(())
  }
}

// ─── Database ────────────────────────────────────────────────────────────────

/// The set of tables in a database, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatabaseSchema {
  tables: BTreeMap<String, TableSchema>,
}

impl DatabaseSchema {
  pub fn new() -> Self { Self::default() }

  pub fn table(&self, name: &str) -> Option<&TableSchema> { self.tables.get(name) }

  pub fn contains_table(&self, name: &str) -> bool { self.tables.contains_key(name) }

  /// All tables, ordered by name.
  pub fn tables(&self) -> impl Iterator<Item = &TableSchema> { self.tables.values() }

  /// Insert or replace a table without any conflict checks. Used when
  /// building a schema from introspection.
  pub fn insert(&mut self, table: TableSchema) {
    self.tables.insert(table.name.clone(), table);
  }

  /// A copy of this schema with `table` added.
  pub fn create_table(&self, table: TableSchema) -> Result<Self> {
    if self.contains_table(&table.name) {
      return Err(SchemaConflict::TableExists(table.name).into());
    }
    let mut next = self.clone();
    next.insert(table);
    Ok(next)
  }

  /// A copy of this schema without the table `name`.
  pub fn drop_table(&self, name: &str) -> Result<Self> {
    let mut next = self.clone();
    next
      .tables
      .remove(name)
      .ok_or_else(|| SchemaConflict::TableMissing(name.to_owned()))?;
    Ok(next)
  }

  /// A copy of this schema with `alter` applied. Either every change
  /// applies or the call fails and nothing is returned.
  pub fn alter_table(&self, alter: &AlterTable) -> Result<Self> {
    let mut table = self
      .table(&alter.table)
      .cloned()
      .ok_or_else(|| SchemaConflict::TableMissing(alter.table.clone()))?;
    alter.apply_to(&mut table)?;

    let mut next = self.clone();
    next.insert(table);
    Ok(next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  fn people() -> DatabaseSchema {
    DatabaseSchema::new()
      .create_table(TableSchema::new("people", vec![
        ColumnDef::integer("id").primary_key(),
        ColumnDef::text("name"),
        ColumnDef::text("email").nullable(),
      ]))
      .unwrap()
  }

  #[test]
  fn add_after_anchor_and_append() {
    let schema = people()
      .alter_table(
        &AlterTable::new("people")
          .add_column_after(ColumnDef::text("nickname").nullable(), "name")
          .add_column(ColumnDef::integer("age").nullable()),
      )
      .unwrap();

    assert_eq!(
      schema.table("people").unwrap().column_names(),
      ["id", "name", "nickname", "email", "age"]
    );
  }

  #[test]
  fn failed_alter_leaves_input_untouched() {
    let before = people();
    let err = before
      .alter_table(
        &AlterTable::new("people")
          .add_column(ColumnDef::integer("age").nullable())
          .add_column(ColumnDef::text("email").nullable()),
      )
      .unwrap_err();

    assert!(matches!(
      err,
      Error::SchemaConflict(SchemaConflict::ColumnExists { ref column, .. })
        if column == "email"
    ));
    assert_eq!(before, people());
  }

  #[test]
  fn missing_anchor_is_a_conflict() {
    let err = people()
      .alter_table(
        &AlterTable::new("people")
          .add_column_after(ColumnDef::text("x").nullable(), "nope"),
      )
      .unwrap_err();
    assert!(matches!(
      err,
      Error::SchemaConflict(SchemaConflict::AnchorMissing { .. })
    ));
  }

  #[test]
  fn drop_missing_column_is_a_conflict() {
    let err = people()
      .alter_table(&AlterTable::new("people").drop_column("age"))
      .unwrap_err();
    assert!(matches!(
      err,
      Error::SchemaConflict(SchemaConflict::ColumnMissing { .. })
    ));
  }

  #[test]
  fn table_level_conflicts() {
    let schema = people();
    assert!(matches!(
      schema.create_table(TableSchema::new("people", vec![])),
      Err(Error::SchemaConflict(SchemaConflict::TableExists(_)))
    ));
    assert!(matches!(
      schema.drop_table("ghosts"),
      Err(Error::SchemaConflict(SchemaConflict::TableMissing(_)))
    ));
    assert!(matches!(
      schema.alter_table(&AlterTable::new("ghosts").drop_column("id")),
      Err(Error::SchemaConflict(SchemaConflict::TableMissing(_)))
    ));
    assert!(!schema.drop_table("people").unwrap().contains_table("people"));
  }

  #[test]
  fn column_type_names_round_trip() {
    for ty in [ColumnType::Integer, ColumnType::Text, ColumnType::Timestamp] {
      assert_eq!(ColumnType::from_sql(ty.sql()), Some(ty));
    }
    assert_eq!(ColumnType::from_sql("integer"), Some(ColumnType::Integer));
    assert_eq!(ColumnType::from_sql("BLOB"), None);
  }
}
