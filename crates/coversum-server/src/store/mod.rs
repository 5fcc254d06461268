//! Record store for book-cover summaries
//!
//! One entity, four capabilities: create, get by id, partial update by
//! id, list all. The store is injected as a trait object so HTTP
//! handlers never touch a global instance and tests can swap in
//! [`MemorySummaryStore`].
//!
//! Records are never deleted. A record is always created with
//! `status_processing = true` and `generated_summary = NULL`; only the
//! completion mutation changes those fields.

mod memory;
mod postgres;

pub use memory::MemorySummaryStore;
pub use postgres::PgSummaryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// One book-cover submission and its eventual summary.
///
/// Serialized in camelCase to match the browser client's contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: i32,
    pub book_name: String,
    pub image_url: String,
    pub status_processing: bool,
    pub generated_summary: Option<String>,
    pub created_at: String,
}

/// Fields supplied at creation; everything else is store-assigned.
#[derive(Debug, Clone)]
pub struct NewSummary {
    pub book_name: String,
    pub image_url: String,
}

/// Partial update; only supplied fields are applied.
///
/// `generated_summary` is doubly optional: `Some(None)` explicitly
/// clears the column, `None` leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct SummaryPatch {
    pub status_processing: Option<bool>,
    pub generated_summary: Option<Option<String>>,
}

/// Store failures; surfaced to callers as internal errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// CRUD contract for summary records.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Insert a new record with `status_processing = true` and no
    /// summary, returning the full row including the assigned id.
    async fn create(&self, new: NewSummary) -> Result<Summary, StoreError>;

    /// Fetch a record by id; `None` when absent.
    async fn get(&self, id: i32) -> Result<Option<Summary>, StoreError>;

    /// Apply a partial update; `None` when the id is absent.
    async fn update(&self, id: i32, patch: SummaryPatch) -> Result<Option<Summary>, StoreError>;

    /// Unordered snapshot of all records. Not used on any hot path.
    async fn list_all(&self) -> Result<Vec<Summary>, StoreError>;

    /// Cheap connectivity check backing the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Store handle shared by HTTP handlers.
pub type SharedSummaryStore = Arc<dyn SummaryStore>;
