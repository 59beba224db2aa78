//! Comparison persistence: named groupings of document ids.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{ComparisonRecord, NewComparison};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::Comparison;
use crate::schema::comparisons;

/// Comparison repository with compile-time query checking.
#[derive(Clone)]
pub struct ComparisonRepository {
    pool: AsyncSqlitePool,
}

impl ComparisonRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Create a comparison, returning its id.
    ///
    /// Minimum-cardinality validation (>= 2 ids) belongs to the API
    /// boundary; the repository stores whatever it is given.
    pub async fn create(
        &self,
        title: &str,
        description: Option<&str>,
        document_ids: &[i32],
    ) -> Result<i32, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();
        let ids = serde_json::to_string(document_ids).unwrap_or_default();

        let id = diesel::insert_into(comparisons::table)
            .values(NewComparison {
                title,
                description,
                document_ids: &ids,
                created_at: &now,
                updated_at: &now,
            })
            .returning(comparisons::id)
            .get_result(&mut conn)
            .await?;

        Ok(id)
    }

    /// Get a comparison by id.
    pub async fn get(&self, id: i32) -> Result<Option<Comparison>, DieselError> {
        let mut conn = self.pool.get().await?;

        let record: Option<ComparisonRecord> = comparisons::table
            .find(id)
            .first(&mut conn)
            .await
            .optional()?;

        Ok(record.map(record_to_comparison))
    }

    /// Get all comparisons, newest first.
    pub async fn get_all(&self) -> Result<Vec<Comparison>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<ComparisonRecord> = comparisons::table
            .order(comparisons::created_at.desc())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(record_to_comparison).collect())
    }

    /// Delete a comparison. Returns false if it didn't exist.
    pub async fn delete(&self, id: i32) -> Result<bool, DieselError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel::delete(comparisons::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(deleted > 0)
    }
}

fn record_to_comparison(record: ComparisonRecord) -> Comparison {
    Comparison {
        id: record.id,
        title: record.title,
        description: record.description,
        document_ids: serde_json::from_str(&record.document_ids).unwrap_or_default(),
        created_at: parse_datetime(&record.created_at),
        updated_at: parse_datetime(&record.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DbContext;
    use tempfile::tempdir;

    async fn setup() -> (ComparisonRepository, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let ctx = DbContext::from_sqlite_path(&dir.path().join("test.db"));
        ctx.init_schema().await.unwrap();
        (ctx.comparisons(), dir)
    }

    #[tokio::test]
    async fn test_create_preserves_id_order() {
        let (repo, _dir) = setup().await;

        let id = repo
            .create("Q3 vs Q4", Some("quarter over quarter"), &[7, 3, 11])
            .await
            .unwrap();

        let comparison = repo.get(id).await.unwrap().unwrap();
        assert_eq!(comparison.title, "Q3 vs Q4");
        assert_eq!(comparison.document_ids, vec![7, 3, 11]);

        // Idempotent re-fetch
        let again = repo.get(id).await.unwrap().unwrap();
        assert_eq!(comparison.document_ids, again.document_ids);
        assert_eq!(comparison.created_at, again.created_at);
    }

    #[tokio::test]
    async fn test_delete() {
        let (repo, _dir) = setup().await;

        let id = repo.create("Pair", None, &[1, 2]).await.unwrap();
        assert!(repo.delete(id).await.unwrap());
        assert!(repo.get(id).await.unwrap().is_none());
        assert!(!repo.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_all() {
        let (repo, _dir) = setup().await;
        repo.create("A", None, &[1, 2]).await.unwrap();
        repo.create("B", None, &[3, 4]).await.unwrap();

        let all = repo.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
