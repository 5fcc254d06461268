use crate::store::{SharedSummaryStore, StoreError, Summary, SummaryPatch};
use serde::Deserialize;

/// JSON body of the completion callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteSummaryBody {
    pub summary: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompleteSummaryCommand {
    pub id: i32,
    pub summary: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CompleteSummaryError {
    #[error("Summary {0} not found")]
    NotFound(i32),

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

/// Completion mutation: flips the record out of processing and attaches
/// the generated text (or clears it when none was supplied).
///
/// There is no idempotency guard; repeated calls overwrite the summary,
/// last write wins.
#[tracing::instrument(skip(store, command), fields(id = command.id))]
pub async fn handle(
    store: SharedSummaryStore,
    command: CompleteSummaryCommand,
) -> Result<Summary, CompleteSummaryError> {
    let patch = SummaryPatch {
        status_processing: Some(false),
        generated_summary: Some(command.summary),
    };

    let updated = store
        .update(command.id, patch)
        .await?
        .ok_or(CompleteSummaryError::NotFound(command.id))?;

    tracing::info!(id = updated.id, "Summary completed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemorySummaryStore, NewSummary, SummaryStore};
    use std::sync::Arc;

    async fn store_with_record() -> SharedSummaryStore {
        let store = MemorySummaryStore::new();
        store
            .create(NewSummary {
                book_name: "cover.png".to_string(),
                image_url: "data:image/png;base64,aGk=".to_string(),
            })
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_completion_attaches_summary() {
        let store = store_with_record().await;

        let command = CompleteSummaryCommand {
            id: 1,
            summary: Some("done".to_string()),
        };
        let updated = handle(store, command).await.unwrap();

        assert!(!updated.status_processing);
        assert_eq!(updated.generated_summary.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn test_completion_without_summary_clears_it() {
        let store = store_with_record().await;

        let command = CompleteSummaryCommand {
            id: 1,
            summary: None,
        };
        let updated = handle(store, command).await.unwrap();

        assert!(!updated.status_processing);
        assert_eq!(updated.generated_summary, None);
    }

    #[tokio::test]
    async fn test_repeated_completion_is_last_write_wins() {
        let store = store_with_record().await;

        let first = handle(
            store.clone(),
            CompleteSummaryCommand {
                id: 1,
                summary: Some("first".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(first.generated_summary.as_deref(), Some("first"));

        let second = handle(
            store.clone(),
            CompleteSummaryCommand {
                id: 1,
                summary: Some("second".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(second.generated_summary.as_deref(), Some("second"));

        let stored = store.get(1).await.unwrap().unwrap();
        assert_eq!(stored.generated_summary.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = store_with_record().await;

        let command = CompleteSummaryCommand {
            id: 42,
            summary: Some("lost".to_string()),
        };
        let result = handle(store, command).await;

        assert!(matches!(result, Err(CompleteSummaryError::NotFound(42))));
    }
}
