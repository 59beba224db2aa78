//! Document repository: create, read, and status updates.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{DocumentRecord, NewDocument};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::models::{Document, DocumentStatus, DocumentType};
use crate::schema::documents;

/// Document repository with compile-time query checking.
#[derive(Clone)]
pub struct DocumentRepository {
    pool: AsyncSqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new document in `uploading` status, returning its id.
    pub async fn create(
        &self,
        title: &str,
        document_type: DocumentType,
        file_path: Option<&str>,
    ) -> Result<i32, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let id = diesel::insert_into(documents::table)
            .values(NewDocument {
                title,
                document_type: document_type.as_str(),
                file_path,
                status: DocumentStatus::Uploading.as_str(),
                created_at: &now,
                updated_at: &now,
            })
            .returning(documents::id)
            .get_result(&mut conn)
            .await?;

        Ok(id)
    }

    /// Get a document by id.
    pub async fn get(&self, id: i32) -> Result<Option<Document>, DieselError> {
        let mut conn = self.pool.get().await?;

        let record: Option<DocumentRecord> = documents::table
            .find(id)
            .first(&mut conn)
            .await
            .optional()?;

        Ok(record.map(record_to_document))
    }

    /// Get all documents, newest first.
    pub async fn get_all(&self) -> Result<Vec<Document>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<DocumentRecord> = documents::table
            .order(documents::created_at.desc())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(record_to_document).collect())
    }

    /// Advance a document's status, enforcing the transition table.
    ///
    /// Illegal transitions (including any transition out of a terminal
    /// state) are rejected rather than written.
    pub async fn update_status(
        &self,
        id: i32,
        next: DocumentStatus,
    ) -> Result<(), StatusUpdateError> {
        let current = self
            .get(id)
            .await?
            .ok_or(StatusUpdateError::NotFound(id))?
            .status;

        if !current.can_transition_to(next) {
            return Err(StatusUpdateError::IllegalTransition { from: current, to: next });
        }

        let mut conn = self.pool.get().await.map_err(StatusUpdateError::Database)?;
        let now = Utc::now().to_rfc3339();

        diesel::update(documents::table.find(id))
            .set((
                documents::status.eq(next.as_str()),
                documents::updated_at.eq(&now),
            ))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Count all documents.
    pub async fn count(&self) -> Result<u64, DieselError> {
        let mut conn = self.pool.get().await?;

        use diesel::dsl::count_star;
        let count: i64 = documents::table
            .select(count_star())
            .first(&mut conn)
            .await?;

        Ok(count as u64)
    }
}

/// Errors from status updates.
#[derive(Debug, thiserror::Error)]
pub enum StatusUpdateError {
    #[error("document {0} not found")]
    NotFound(i32),
    #[error("illegal status transition {from} -> {to}")]
    IllegalTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },
    #[error("database error: {0}")]
    Database(#[from] DieselError),
}

fn record_to_document(record: DocumentRecord) -> Document {
    Document {
        id: record.id,
        title: record.title,
        // Unknown strings in the column fall back to Other/Failed rather
        // than panicking on a hand-edited database.
        document_type: DocumentType::from_str(&record.document_type)
            .unwrap_or(DocumentType::Other),
        file_path: record.file_path.map(Into::into),
        status: DocumentStatus::from_str(&record.status).unwrap_or(DocumentStatus::Failed),
        created_at: parse_datetime(&record.created_at),
        updated_at: parse_datetime(&record.updated_at),
    }
}
