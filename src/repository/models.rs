//! Diesel ORM models for database tables.
//!
//! These models provide compile-time type checking for database operations.
//! JSON-valued fields (themes, tone, metrics, issues, document-id lists) are
//! stored as serialized text and decoded in the repositories.

use diesel::prelude::*;

use crate::schema;

/// Document record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentRecord {
    pub id: i32,
    pub title: String,
    pub document_type: String,
    pub file_path: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// New document for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::documents)]
pub struct NewDocument<'a> {
    pub title: &'a str,
    pub document_type: &'a str,
    pub file_path: Option<&'a str>,
    pub status: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Analysis record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::analyses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnalysisRecord {
    pub id: i32,
    pub document_id: i32,
    pub overall_sentiment: String,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub key_themes: String,
    pub emotional_tone: String,
    pub linguistic_metrics: String,
    pub degraded_reason: Option<String>,
    pub created_at: String,
}

/// New analysis for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::analyses)]
pub struct NewAnalysis<'a> {
    pub document_id: i32,
    pub overall_sentiment: &'a str,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub key_themes: &'a str,
    pub emotional_tone: &'a str,
    pub linguistic_metrics: &'a str,
    pub degraded_reason: Option<&'a str>,
    pub created_at: &'a str,
}

/// Section record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::sections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SectionRecord {
    pub id: i32,
    pub analysis_id: i32,
    pub section_title: String,
    pub section_type: Option<String>,
    pub speaker: Option<String>,
    pub original_text: String,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub issues: String,
    pub suggested_revision: String,
    pub revision_rationale: String,
    pub section_order: i32,
    pub created_at: String,
}

/// New section for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::sections)]
pub struct NewSection<'a> {
    pub analysis_id: i32,
    pub section_title: &'a str,
    pub section_type: Option<&'a str>,
    pub speaker: Option<&'a str>,
    pub original_text: &'a str,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub issues: &'a str,
    pub suggested_revision: &'a str,
    pub revision_rationale: &'a str,
    pub section_order: i32,
    pub created_at: &'a str,
}

/// Comparison record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::comparisons)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ComparisonRecord {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub document_ids: String,
    pub created_at: String,
    pub updated_at: String,
}

/// New comparison for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::comparisons)]
pub struct NewComparison<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub document_ids: &'a str,
    pub created_at: &'a str,
    pub updated_at: &'a str,
}

/// Metrics history record from the database.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = schema::metrics_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MetricsRecord {
    pub id: i32,
    pub document_id: i32,
    pub analysis_id: i32,
    pub document_type: String,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub recorded_at: String,
}

/// New metrics snapshot for insertion.
#[derive(Insertable, Debug)]
#[diesel(table_name = schema::metrics_history)]
pub struct NewMetrics<'a> {
    pub document_id: i32,
    pub analysis_id: i32,
    pub document_type: &'a str,
    pub sentiment_score: i32,
    pub confidence_score: i32,
    pub clarity_score: i32,
    pub readability_score: i32,
    pub specificity_score: i32,
    pub recorded_at: &'a str,
}
