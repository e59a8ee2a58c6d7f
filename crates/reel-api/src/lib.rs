//! JSON REST API for Reel.
//!
//! Exposes an axum [`Router`] backed by any [`reel_core::store::RecordStore`].
//! Records are rendered through [`reel_core::resource::RecordResource`] and
//! wrapped in a `{"data": ...}` envelope. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", reel_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod records;
pub mod videos;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use reel_core::store::RecordStore;
use serde::Serialize;

pub use error::ApiError;

/// The `{"data": ...}` envelope around every successful resource response.
#[derive(Debug, Serialize)]
pub struct Data<T> {
  pub data: T,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Records
    .route("/records", get(records::list::<S>).post(records::create::<S>))
    .route("/records/{id}", get(records::get_one::<S>))
    // Videos
    .route("/videos/{id}", get(videos::get_one::<S>))
    .route("/videos/{id}/metadata", put(videos::update_metadata::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
