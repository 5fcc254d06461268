use crate::store::{SharedSummaryStore, StoreError, Summary};

#[derive(Debug, Clone)]
pub struct GetSummaryQuery {
    pub id: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum GetSummaryError {
    #[error("Summary {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

/// Read-only status lookup; reports the record exactly as stored,
/// including `status_processing` and the summary when present.
#[tracing::instrument(skip(store, query), fields(id = query.id))]
pub async fn handle(
    store: SharedSummaryStore,
    query: GetSummaryQuery,
) -> Result<Summary, GetSummaryError> {
    store
        .get(query.id)
        .await?
        .ok_or(GetSummaryError::NotFound(query.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemorySummaryStore, NewSummary, SummaryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_returns_full_record() {
        let store = MemorySummaryStore::new();
        store
            .create(NewSummary {
                book_name: "cover.png".to_string(),
                image_url: "data:image/png;base64,aGk=".to_string(),
            })
            .await
            .unwrap();
        let store: SharedSummaryStore = Arc::new(store);

        let summary = handle(store, GetSummaryQuery { id: 1 }).await.unwrap();

        assert_eq!(summary.id, 1);
        assert_eq!(summary.book_name, "cover.png");
        assert!(summary.status_processing);
        assert_eq!(summary.generated_summary, None);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store: SharedSummaryStore = Arc::new(MemorySummaryStore::new());

        let result = handle(store, GetSummaryQuery { id: 9 }).await;

        assert!(matches!(result, Err(GetSummaryError::NotFound(9))));
    }
}
