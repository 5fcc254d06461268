//! PostgreSQL-backed summary store

use super::{NewSummary, StoreError, Summary, SummaryPatch, SummaryStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

/// Store over the `summaries` table.
///
/// Every call is a single-row statement; the database's row-level
/// atomicity is the only coordination in play. Concurrent updates to
/// the same id are last-write-wins.
#[derive(Clone)]
pub struct PgSummaryStore {
    pool: PgPool,
}

impl PgSummaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryStore for PgSummaryStore {
    #[tracing::instrument(skip(self, new), fields(book_name = %new.book_name))]
    async fn create(&self, new: NewSummary) -> Result<Summary, StoreError> {
        let summary = sqlx::query_as::<_, Summary>(
            r#"
            INSERT INTO summaries (book_name, image_url, status_processing, generated_summary, created_at)
            VALUES ($1, $2, TRUE, NULL, $3)
            RETURNING id, book_name, image_url, status_processing, generated_summary, created_at
            "#,
        )
        .bind(&new.book_name)
        .bind(&new.image_url)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, id: i32) -> Result<Option<Summary>, StoreError> {
        let summary = sqlx::query_as::<_, Summary>(
            r#"
            SELECT id, book_name, image_url, status_processing, generated_summary, created_at
            FROM summaries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(&self, id: i32, patch: SummaryPatch) -> Result<Option<Summary>, StoreError> {
        // $3 flags whether generated_summary was supplied at all, so an
        // explicit NULL can be told apart from "leave unchanged".
        let summary = sqlx::query_as::<_, Summary>(
            r#"
            UPDATE summaries
            SET status_processing = COALESCE($2, status_processing),
                generated_summary = CASE WHEN $3 THEN $4 ELSE generated_summary END
            WHERE id = $1
            RETURNING id, book_name, image_url, status_processing, generated_summary, created_at
            "#,
        )
        .bind(id)
        .bind(patch.status_processing)
        .bind(patch.generated_summary.is_some())
        .bind(patch.generated_summary.flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(summary)
    }

    #[tracing::instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<Summary>, StoreError> {
        let summaries = sqlx::query_as::<_, Summary>(
            r#"
            SELECT id, book_name, image_url, status_processing, generated_summary, created_at
            FROM summaries
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
