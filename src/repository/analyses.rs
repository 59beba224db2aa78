//! Analysis and section persistence.
//!
//! Analyses are create-only: one row per successful annotation call, never
//! updated. Sections are inserted in bulk immediately after their parent
//! analysis, with `section_order` assigned from emission order.

use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use super::models::{AnalysisRecord, NewAnalysis, NewSection, SectionRecord};
use super::parse_datetime;
use super::pool::{AsyncSqlitePool, DieselError};
use crate::llm::{DocumentAnnotation, SectionAnnotation};
use crate::models::{Analysis, Section, SentimentLabel};
use crate::schema::{analyses, sections};

/// Analysis repository with compile-time query checking.
#[derive(Clone)]
pub struct AnalysisRepository {
    pool: AsyncSqlitePool,
}

impl AnalysisRepository {
    pub fn new(pool: AsyncSqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a document-level annotation, returning the new analysis id.
    ///
    /// `degraded_reason` records why the row holds placeholder values when
    /// the annotation call degraded.
    pub async fn create(
        &self,
        document_id: i32,
        annotation: &DocumentAnnotation,
        degraded_reason: Option<&str>,
    ) -> Result<i32, DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        let key_themes = serde_json::to_string(&annotation.key_themes).unwrap_or_default();
        let emotional_tone = serde_json::to_string(&annotation.emotional_tone).unwrap_or_default();
        let linguistic_metrics =
            serde_json::to_string(&annotation.linguistic_metrics).unwrap_or_default();

        let id = diesel::insert_into(analyses::table)
            .values(NewAnalysis {
                document_id,
                overall_sentiment: annotation.overall_sentiment.as_str(),
                sentiment_score: annotation.sentiment_score,
                confidence_score: annotation.confidence_score,
                clarity_score: annotation.clarity_score,
                readability_score: annotation.readability_score,
                specificity_score: annotation.specificity_score,
                key_themes: &key_themes,
                emotional_tone: &emotional_tone,
                linguistic_metrics: &linguistic_metrics,
                degraded_reason,
                created_at: &now,
            })
            .returning(analyses::id)
            .get_result(&mut conn)
            .await?;

        Ok(id)
    }

    /// Persist section annotations in emission order, starting at order 0.
    pub async fn create_sections(
        &self,
        analysis_id: i32,
        annotations: &[SectionAnnotation],
    ) -> Result<(), DieselError> {
        let mut conn = self.pool.get().await?;
        let now = Utc::now().to_rfc3339();

        for (order, section) in annotations.iter().enumerate() {
            let issues = serde_json::to_string(&section.issues).unwrap_or_default();
            diesel::insert_into(sections::table)
                .values(NewSection {
                    analysis_id,
                    section_title: &section.section_title,
                    section_type: section.section_type.as_deref(),
                    speaker: section.speaker.as_deref(),
                    original_text: &section.original_text,
                    sentiment_score: section.sentiment_score,
                    confidence_score: section.confidence_score,
                    clarity_score: section.clarity_score,
                    readability_score: section.readability_score,
                    specificity_score: section.specificity_score,
                    issues: &issues,
                    suggested_revision: &section.suggested_revision,
                    revision_rationale: &section.revision_rationale,
                    section_order: order as i32,
                    created_at: &now,
                })
                .execute(&mut conn)
                .await?;
        }

        Ok(())
    }

    /// Get the latest analysis for a document, if any.
    pub async fn get_by_document(&self, document_id: i32) -> Result<Option<Analysis>, DieselError> {
        let mut conn = self.pool.get().await?;

        let record: Option<AnalysisRecord> = analyses::table
            .filter(analyses::document_id.eq(document_id))
            .order(analyses::id.desc())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(record.map(record_to_analysis))
    }

    /// Get an analysis by id.
    #[allow(dead_code)]
    pub async fn get(&self, id: i32) -> Result<Option<Analysis>, DieselError> {
        let mut conn = self.pool.get().await?;

        let record: Option<AnalysisRecord> = analyses::table
            .find(id)
            .first(&mut conn)
            .await
            .optional()?;

        Ok(record.map(record_to_analysis))
    }

    /// Get all sections of an analysis, ordered by `section_order`.
    pub async fn sections_for(&self, analysis_id: i32) -> Result<Vec<Section>, DieselError> {
        let mut conn = self.pool.get().await?;

        let records: Vec<SectionRecord> = sections::table
            .filter(sections::analysis_id.eq(analysis_id))
            .order(sections::section_order.asc())
            .load(&mut conn)
            .await?;

        Ok(records.into_iter().map(record_to_section).collect())
    }
}

fn record_to_analysis(record: AnalysisRecord) -> Analysis {
    Analysis {
        id: record.id,
        document_id: record.document_id,
        overall_sentiment: SentimentLabel::from_str(&record.overall_sentiment)
            .unwrap_or(SentimentLabel::Neutral),
        sentiment_score: record.sentiment_score,
        confidence_score: record.confidence_score,
        clarity_score: record.clarity_score,
        readability_score: record.readability_score,
        specificity_score: record.specificity_score,
        key_themes: serde_json::from_str(&record.key_themes).unwrap_or_default(),
        emotional_tone: serde_json::from_str(&record.emotional_tone).unwrap_or_default(),
        linguistic_metrics: serde_json::from_str(&record.linguistic_metrics).unwrap_or_default(),
        degraded_reason: record.degraded_reason,
        created_at: parse_datetime(&record.created_at),
    }
}

fn record_to_section(record: SectionRecord) -> Section {
    Section {
        id: record.id,
        analysis_id: record.analysis_id,
        section_title: record.section_title,
        section_type: record.section_type,
        speaker: record.speaker,
        original_text: record.original_text,
        sentiment_score: record.sentiment_score,
        confidence_score: record.confidence_score,
        clarity_score: record.clarity_score,
        readability_score: record.readability_score,
        specificity_score: record.specificity_score,
        issues: serde_json::from_str(&record.issues).unwrap_or_default(),
        suggested_revision: record.suggested_revision,
        revision_rationale: record.revision_rationale,
        section_order: record.section_order,
    }
}
