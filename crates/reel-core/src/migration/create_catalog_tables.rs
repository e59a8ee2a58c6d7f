use crate::{
  Result,
  migration::Migration,
  schema::{ColumnDef, DatabaseSchema, TableSchema},
};

/// Creates `folders`, `users`, `videos` and `records`.
pub struct CreateCatalogTables;

const TABLES: [&str; 4] = ["folders", "users", "videos", "records"];

fn tables() -> [TableSchema; 4] {
  [
    TableSchema::new("folders", vec![
      ColumnDef::integer("id").primary_key(),
      ColumnDef::text("name"),
    ]),
    TableSchema::new("users", vec![
      ColumnDef::integer("id").primary_key(),
      ColumnDef::text("name"),
    ]),
    TableSchema::new("videos", vec![
      ColumnDef::integer("id").primary_key(),
      ColumnDef::text("name"),
      ColumnDef::text("date").nullable(),
      ColumnDef::integer("folder_id")
        .nullable()
        .references("folders", "id"),
    ]),
    TableSchema::new("records", vec![
      ColumnDef::integer("id").primary_key(),
      ColumnDef::text("name"),
      ColumnDef::integer("user_id").references("users", "id"),
      ColumnDef::integer("video_id").references("videos", "id"),
      ColumnDef::timestamp("created_at"),
      ColumnDef::timestamp("updated_at"),
    ]),
  ]
}

impl Migration for CreateCatalogTables {
  fn version(&self) -> u32 { 1 }

  fn name(&self) -> &'static str { "create_catalog_tables" }

  fn up(&self, schema: &DatabaseSchema) -> Result<DatabaseSchema> {
    tables()
      .into_iter()
      .try_fold(schema.clone(), |acc, table| acc.create_table(table))
  }

  fn down(&self, schema: &DatabaseSchema) -> Result<DatabaseSchema> {
    TABLES
      .iter()
      .rev()
      .try_fold(schema.clone(), |acc, name| acc.drop_table(name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Error, SchemaConflict};

  #[test]
  fn up_creates_every_table() {
    let schema = CreateCatalogTables.up(&DatabaseSchema::new()).unwrap();
    for name in TABLES {
      assert!(schema.contains_table(name), "missing {name}");
    }
    assert_eq!(
      schema.table("videos").unwrap().column_names(),
      ["id", "name", "date", "folder_id"]
    );
  }

  #[test]
  fn up_on_existing_tables_conflicts() {
    let schema = CreateCatalogTables.up(&DatabaseSchema::new()).unwrap();
    assert!(matches!(
      CreateCatalogTables.up(&schema),
      Err(Error::SchemaConflict(SchemaConflict::TableExists(_)))
    ));
  }

  #[test]
  fn down_on_empty_schema_conflicts() {
    assert!(matches!(
      CreateCatalogTables.down(&DatabaseSchema::new()),
      Err(Error::SchemaConflict(SchemaConflict::TableMissing(_)))
    ));
  }
}
