//! Comparison model: a named grouping of documents for side-by-side views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-created grouping of two or more documents.
///
/// Document ids keep their creation order. There is no foreign-key cascade:
/// expanding a comparison whose documents were deleted simply yields fewer
/// entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub document_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
