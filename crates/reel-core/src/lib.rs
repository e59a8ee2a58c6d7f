//! Core types and trait definitions for the Reel catalog.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the entity model, the JSON projection of records, and the schema
//! migrations expressed as pure functions over a [`schema::DatabaseSchema`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod entity;
pub mod error;
pub mod migration;
pub mod resource;
pub mod schema;
pub mod store;

pub use error::{Error, Result, SchemaConflict};
