use crate::{
  Result,
  migration::Migration,
  schema::{AlterTable, ColumnDef, DatabaseSchema},
};

/// Adds the nullable metadata columns to `videos`.
///
/// `date_raw` is placed directly after `date`; the rest are appended in
/// order. Existing rows get `NULL` in every new column.
pub struct AddVideoMetadata;

const TABLE: &str = "videos";

/// Columns added by this step, in the order they are added.
const COLUMNS: [&str; 6] =
  ["date_raw", "title", "duration", "episode", "season", "view_count"];

impl Migration for AddVideoMetadata {
  fn version(&self) -> u32 { 2 }

  fn name(&self) -> &'static str { "add_meta_data_to_videos_table" }

  fn up(&self, schema: &DatabaseSchema) -> Result<DatabaseSchema> {
    schema.alter_table(
      &AlterTable::new(TABLE)
        .add_column_after(ColumnDef::integer("date_raw").nullable(), "date")
        .add_column(ColumnDef::text("title").nullable())
        .add_column(ColumnDef::integer("duration").nullable())
        .add_column(ColumnDef::integer("episode").nullable())
        .add_column(ColumnDef::integer("season").nullable())
        .add_column(ColumnDef::integer("view_count").nullable()),
    )
  }

  fn down(&self, schema: &DatabaseSchema) -> Result<DatabaseSchema> {
    let alter = COLUMNS
      .iter()
      .fold(AlterTable::new(TABLE), |alter, column| alter.drop_column(*column));
    schema.alter_table(&alter)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    Error, SchemaConflict,
    schema::{ColumnType, TableSchema},
  };

  fn base() -> DatabaseSchema {
    DatabaseSchema::new()
      .create_table(TableSchema::new("videos", vec![
        ColumnDef::integer("id").primary_key(),
        ColumnDef::text("name"),
        ColumnDef::text("date").nullable(),
        ColumnDef::integer("folder_id").nullable(),
      ]))
      .unwrap()
  }

  #[test]
  fn up_places_date_raw_after_date() {
    let extended = AddVideoMetadata.up(&base()).unwrap();
    let videos = extended.table("videos").unwrap();

    assert_eq!(videos.column_names(), [
      "id", "name", "date", "date_raw", "folder_id", "title", "duration",
      "episode", "season", "view_count",
    ]);
    for name in COLUMNS {
      assert!(videos.column(name).unwrap().nullable, "{name} not nullable");
    }
    assert_eq!(videos.column("title").unwrap().ty, ColumnType::Text);
    assert_eq!(videos.column("view_count").unwrap().ty, ColumnType::Integer);
  }

  #[test]
  fn down_after_up_restores_base() {
    let before = base();
    let after = AddVideoMetadata
      .down(&AddVideoMetadata.up(&before).unwrap())
      .unwrap();
    assert_eq!(after, before);
  }

  #[test]
  fn up_twice_conflicts() {
    let extended = AddVideoMetadata.up(&base()).unwrap();
    assert!(matches!(
      AddVideoMetadata.up(&extended),
      Err(Error::SchemaConflict(SchemaConflict::ColumnExists { .. }))
    ));
  }

  #[test]
  fn down_on_base_conflicts() {
    assert!(matches!(
      AddVideoMetadata.down(&base()),
      Err(Error::SchemaConflict(SchemaConflict::ColumnMissing { .. }))
    ));
  }

  #[test]
  fn missing_table_conflicts() {
    assert!(matches!(
      AddVideoMetadata.up(&DatabaseSchema::new()),
      Err(Error::SchemaConflict(SchemaConflict::TableMissing(_)))
    ));
  }

  #[test]
  fn missing_date_column_conflicts() {
    let schema = DatabaseSchema::new()
      .create_table(TableSchema::new("videos", vec![
        ColumnDef::integer("id").primary_key(),
      ]))
      .unwrap();
    assert!(matches!(
      AddVideoMetadata.up(&schema),
      Err(Error::SchemaConflict(SchemaConflict::AnchorMissing { .. }))
    ));
  }
}
