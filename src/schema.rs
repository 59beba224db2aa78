// Diesel table definitions, kept in sync with DbContext::init_schema.

diesel::table! {
    documents (id) {
        id -> Integer,
        title -> Text,
        document_type -> Text,
        file_path -> Nullable<Text>,
        status -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    analyses (id) {
        id -> Integer,
        document_id -> Integer,
        overall_sentiment -> Text,
        sentiment_score -> Integer,
        confidence_score -> Integer,
        clarity_score -> Integer,
        readability_score -> Integer,
        specificity_score -> Integer,
        key_themes -> Text,
        emotional_tone -> Text,
        linguistic_metrics -> Text,
        degraded_reason -> Nullable<Text>,
        created_at -> Text,
    }
}

diesel::table! {
    sections (id) {
        id -> Integer,
        analysis_id -> Integer,
        section_title -> Text,
        section_type -> Nullable<Text>,
        speaker -> Nullable<Text>,
        original_text -> Text,
        sentiment_score -> Integer,
        confidence_score -> Integer,
        clarity_score -> Integer,
        readability_score -> Integer,
        specificity_score -> Integer,
        issues -> Text,
        suggested_revision -> Text,
        revision_rationale -> Text,
        section_order -> Integer,
        created_at -> Text,
    }
}

diesel::table! {
    comparisons (id) {
        id -> Integer,
        title -> Text,
        description -> Nullable<Text>,
        document_ids -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    metrics_history (id) {
        id -> Integer,
        document_id -> Integer,
        analysis_id -> Integer,
        document_type -> Text,
        sentiment_score -> Integer,
        confidence_score -> Integer,
        clarity_score -> Integer,
        readability_score -> Integer,
        specificity_score -> Integer,
        recorded_at -> Text,
    }
}

diesel::joinable!(analyses -> documents (document_id));
diesel::joinable!(sections -> analyses (analysis_id));

diesel::allow_tables_to_appear_in_same_query!(
    analyses,
    comparisons,
    documents,
    metrics_history,
    sections,
);
