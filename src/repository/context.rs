//! Database context for managing connections and repository access.
//!
//! Provides a unified entry point for database operations. Create one
//! context per command or service, then use it to access all repositories.

use std::path::Path;

use diesel_async::SimpleAsyncConnection;

use super::analyses::AnalysisRepository;
use super::comparisons::ComparisonRepository;
use super::documents::DocumentRepository;
use super::metrics::MetricsRepository;
use super::pool::{AsyncSqliteConnection, AsyncSqlitePool, DieselError};

/// Database context that owns the connection factory and hands out
/// repositories.
#[derive(Clone)]
pub struct DbContext {
    pool: AsyncSqlitePool,
}

impl DbContext {
    /// Create a new database context from a database URL or file path.
    pub fn from_url(database_url: &str) -> Self {
        Self {
            pool: AsyncSqlitePool::new(database_url),
        }
    }

    /// Create a new database context from a file path.
    pub fn from_sqlite_path(db_path: &Path) -> Self {
        Self {
            pool: AsyncSqlitePool::from_path(db_path),
        }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &AsyncSqlitePool {
        &self.pool
    }

    /// Get a document repository.
    pub fn documents(&self) -> DocumentRepository {
        DocumentRepository::new(self.pool.clone())
    }

    /// Get an analysis repository.
    pub fn analyses(&self) -> AnalysisRepository {
        AnalysisRepository::new(self.pool.clone())
    }

    /// Get a comparison repository.
    pub fn comparisons(&self) -> ComparisonRepository {
        ComparisonRepository::new(self.pool.clone())
    }

    /// Get a metrics history repository.
    pub fn metrics(&self) -> MetricsRepository {
        MetricsRepository::new(self.pool.clone())
    }

    /// Initialize the database schema.
    ///
    /// Creates the tables if they don't exist. Column constraints stop at
    /// types; score bounds and status transitions live in application code.
    pub async fn init_schema(&self) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        Self::create_tables(&mut conn).await
    }

    async fn create_tables(conn: &mut AsyncSqliteConnection) -> Result<(), DieselError> {
        conn.batch_execute(
            r#"
            -- Documents table
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                document_type TEXT NOT NULL,
                file_path TEXT,
                status TEXT NOT NULL DEFAULT 'uploading',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Analyses table
            CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL,
                overall_sentiment TEXT NOT NULL,
                sentiment_score INTEGER NOT NULL,
                confidence_score INTEGER NOT NULL,
                clarity_score INTEGER NOT NULL,
                readability_score INTEGER NOT NULL,
                specificity_score INTEGER NOT NULL,
                key_themes TEXT NOT NULL,
                emotional_tone TEXT NOT NULL,
                linguistic_metrics TEXT NOT NULL,
                degraded_reason TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (document_id) REFERENCES documents(id)
            );

            -- Sections table
            CREATE TABLE IF NOT EXISTS sections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                analysis_id INTEGER NOT NULL,
                section_title TEXT NOT NULL,
                section_type TEXT,
                speaker TEXT,
                original_text TEXT NOT NULL,
                sentiment_score INTEGER NOT NULL,
                confidence_score INTEGER NOT NULL,
                clarity_score INTEGER NOT NULL,
                readability_score INTEGER NOT NULL,
                specificity_score INTEGER NOT NULL,
                issues TEXT NOT NULL,
                suggested_revision TEXT NOT NULL,
                revision_rationale TEXT NOT NULL,
                section_order INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (analysis_id) REFERENCES analyses(id)
            );

            -- Comparisons table
            CREATE TABLE IF NOT EXISTS comparisons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                document_ids TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            -- Metrics history table
            CREATE TABLE IF NOT EXISTS metrics_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL,
                analysis_id INTEGER NOT NULL,
                document_type TEXT NOT NULL,
                sentiment_score INTEGER NOT NULL,
                confidence_score INTEGER NOT NULL,
                clarity_score INTEGER NOT NULL,
                readability_score INTEGER NOT NULL,
                specificity_score INTEGER NOT NULL,
                recorded_at TEXT NOT NULL,
                FOREIGN KEY (document_id) REFERENCES documents(id),
                FOREIGN KEY (analysis_id) REFERENCES analyses(id)
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_analyses_document ON analyses(document_id);
            CREATE INDEX IF NOT EXISTS idx_sections_analysis ON sections(analysis_id, section_order);
            CREATE INDEX IF NOT EXISTS idx_metrics_type ON metrics_history(document_type, recorded_at);
            "#,
        )
        .await
    }

    /// Get list of all tables in the database.
    #[allow(dead_code)]
    pub async fn list_tables(&self) -> Result<Vec<String>, DieselError> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<TableName> = diesel_async::RunQueryDsl::load(
            diesel::sql_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            ),
            &mut conn,
        )
        .await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }
}

#[derive(diesel::QueryableByName)]
struct TableName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_init_schema_creates_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let ctx = DbContext::from_sqlite_path(&db_path);
        ctx.init_schema().await.unwrap();

        let tables = ctx.list_tables().await.unwrap();
        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"analyses".to_string()));
        assert!(tables.contains(&"sections".to_string()));
        assert!(tables.contains(&"comparisons".to_string()));
        assert!(tables.contains(&"metrics_history".to_string()));
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let ctx = DbContext::from_sqlite_path(&db_path);
        ctx.init_schema().await.unwrap();
        ctx.init_schema().await.unwrap();

        let docs = ctx.documents().get_all().await.unwrap();
        assert!(docs.is_empty());
    }
}
