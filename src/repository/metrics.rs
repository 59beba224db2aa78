//! Metrics history persistence: append-only score snapshots.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{MetricsRecord, NewMetrics};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{DocumentType, MetricsSnapshot};
use crate::schema::metrics_history;

/// Metrics history repository. Rows are written once per completed
/// analysis and never updated or deleted.
#[derive(Clone)]
pub struct MetricsRepository {
    pool: AsyncSqlitePool,
}

impl MetricsRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Record a snapshot of the five summary scores.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        document_id: i32,
        analysis_id: i32,
        document_type: DocumentType,
        sentiment_score: i32,
        confidence_score: i32,
        clarity_score: i32,
        readability_score: i32,
        specificity_score: i32,
    ) -> Result<i32, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let id = diesel::insert_into(metrics_history::table)
            .values(NewMetrics {
                document_id,
                analysis_id,
                document_type: document_type.as_str(),
                sentiment_score,
                confidence_score,
                clarity_score,
                readability_score,
                specificity_score,
                recorded_at: &now,
            })
            .returning(metrics_history::id)
            .get_result(&mut conn)
            .await?;

        Ok(id)
    }

    /// Get recent snapshots, newest first.
    pub async fn history(&self, limit: u32) -> Result<Vec<MetricsSnapshot>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<MetricsRecord> = metrics_history::table
            .order(metrics_history::recorded_at.desc())
            .limit(limit as i64)
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(record_to_snapshot).collect())
    }

    /// Get snapshots for one document type, newest first.
    pub async fn by_type(
        &self,
        document_type: DocumentType,
    ) -> Result<Vec<MetricsSnapshot>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<MetricsRecord> = metrics_history::table
            .filter(metrics_history::document_type.eq(document_type.as_str()))
            .order(metrics_history::recorded_at.desc())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(record_to_snapshot).collect())
    }
}

fn record_to_snapshot(record: MetricsRecord) -> MetricsSnapshot {
    MetricsSnapshot {
        id: record.id,
        document_id: record.document_id,
        analysis_id: record.analysis_id,
        document_type: DocumentType::from_str(&record.document_type)
            .unwrap_or(DocumentType::Other),
        sentiment_score: record.sentiment_score,
        confidence_score: record.confidence_score,
        clarity_score: record.clarity_score,
        readability_score: record.readability_score,
        specificity_score: record.specificity_score,
        recorded_at: parse_datetime(&record.recorded_at),
    }
}
