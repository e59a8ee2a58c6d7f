//! Schema migrations as explicit, reversible steps.
//!
//! A [`Migration`] maps one [`DatabaseSchema`] to the next (`up`) and back
//! (`down`). Steps never record whether they ran; that ledger belongs to
//! whichever runner executes them against real storage.

mod add_video_metadata;
mod create_catalog_tables;

use std::sync::Arc;

pub use add_video_metadata::AddVideoMetadata;
pub use create_catalog_tables::CreateCatalogTables;

use crate::{Result, schema::DatabaseSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Up,
  Down,
}

pub trait Migration: Send + Sync {
  /// Monotonic ordering key; unique within a catalog.
  fn version(&self) -> u32;

  fn name(&self) -> &'static str;

  fn up(&self, schema: &DatabaseSchema) -> Result<DatabaseSchema>;

  /// The exact inverse of [`Migration::up`].
  fn down(&self, schema: &DatabaseSchema) -> Result<DatabaseSchema>;

  fn apply(
    &self,
    schema: &DatabaseSchema,
    direction: Direction,
  ) -> Result<DatabaseSchema> {
    match direction {
      Direction::Up => self.up(schema),
      Direction::Down => self.down(schema),
    }
  }
}

/// Every migration in version order.
pub fn catalog() -> Vec<Arc<dyn Migration>> {
  vec![Arc::new(CreateCatalogTables), Arc::new(AddVideoMetadata)]
}
