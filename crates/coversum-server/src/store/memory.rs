//! In-memory summary store
//!
//! Mirrors the PostgreSQL store's semantics over a mutex-guarded map.
//! Used by tests and local development without a database.

use super::{NewSummary, StoreError, Summary, SummaryPatch, SummaryStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemorySummaryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i32,
    rows: BTreeMap<i32, Summary>,
}

impl MemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another test thread panicked; the
        // map itself is still usable.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SummaryStore for MemorySummaryStore {
    async fn create(&self, new: NewSummary) -> Result<Summary, StoreError> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;

        let summary = Summary {
            id,
            book_name: new.book_name,
            image_url: new.image_url,
            status_processing: true,
            generated_summary: None,
            created_at: Utc::now().to_rfc3339(),
        };

        inner.rows.insert(id, summary.clone());
        Ok(summary)
    }

    async fn get(&self, id: i32) -> Result<Option<Summary>, StoreError> {
        Ok(self.lock().rows.get(&id).cloned())
    }

    async fn update(&self, id: i32, patch: SummaryPatch) -> Result<Option<Summary>, StoreError> {
        let mut inner = self.lock();
        let Some(row) = inner.rows.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(status_processing) = patch.status_processing {
            row.status_processing = status_processing;
        }
        if let Some(generated_summary) = patch.generated_summary {
            row.generated_summary = generated_summary;
        }

        Ok(Some(row.clone()))
    }

    async fn list_all(&self) -> Result<Vec<Summary>, StoreError> {
        Ok(self.lock().rows.values().cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
