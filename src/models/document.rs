//! Document model and processing status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Category of an investor relations document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    PressRelease,
    EarningsCall,
    CorporateRelease,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PressRelease => "press_release",
            Self::EarningsCall => "earnings_call",
            Self::CorporateRelease => "corporate_release",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "press_release" => Some(Self::PressRelease),
            "earnings_call" => Some(Self::EarningsCall),
            "corporate_release" => Some(Self::CorporateRelease),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processing status of a document.
///
/// Statuses advance monotonically within one processing attempt. The text
/// path is uploading -> processing -> completed; the audio path is
/// uploading -> transcribing -> analyzing -> completed. `failed` is reachable
/// from every non-terminal state; nothing leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploading,
    Transcribing,
    Processing,
    Analyzing,
    Completed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Transcribing => "transcribing",
            Self::Processing => "processing",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "uploading" => Some(Self::Uploading),
            "transcribing" => Some(Self::Transcribing),
            "processing" => Some(Self::Processing),
            "analyzing" => Some(Self::Analyzing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a transition from this status to `next` is legal.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        use DocumentStatus::*;
        match (self, next) {
            (Uploading, Transcribing | Processing) => true,
            (Transcribing, Analyzing) => true,
            (Processing, Completed) => true,
            (Analyzing, Completed) => true,
            (s, Failed) if !s.is_terminal() => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An uploaded investor relations document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Database row ID.
    pub id: i32,
    /// User-supplied title.
    pub title: String,
    /// Document category.
    pub document_type: DocumentType,
    /// Path to the stored upload on disk.
    pub file_path: Option<PathBuf>,
    /// Current processing status.
    pub status: DocumentStatus,
    /// When the document was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Uploading,
            DocumentStatus::Transcribing,
            DocumentStatus::Processing,
            DocumentStatus::Analyzing,
            DocumentStatus::Completed,
            DocumentStatus::Failed,
        ] {
            assert_eq!(DocumentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(DocumentStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_text_path_transitions() {
        use DocumentStatus::*;
        assert!(Uploading.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(!Uploading.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Analyzing));
    }

    #[test]
    fn test_audio_path_transitions() {
        use DocumentStatus::*;
        assert!(Uploading.can_transition_to(Transcribing));
        assert!(Transcribing.can_transition_to(Analyzing));
        assert!(Analyzing.can_transition_to(Completed));
        assert!(!Transcribing.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        use DocumentStatus::*;
        for next in [Uploading, Transcribing, Processing, Analyzing, Completed, Failed] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Failed.can_transition_to(next));
        }
    }

    #[test]
    fn test_failed_reachable_from_non_terminal() {
        use DocumentStatus::*;
        for from in [Uploading, Transcribing, Processing, Analyzing] {
            assert!(from.can_transition_to(Failed));
        }
    }

    #[test]
    fn test_document_type_round_trip() {
        for ty in [
            DocumentType::PressRelease,
            DocumentType::EarningsCall,
            DocumentType::CorporateRelease,
            DocumentType::Other,
        ] {
            assert_eq!(DocumentType::from_str(ty.as_str()), Some(ty));
        }
        assert_eq!(DocumentType::from_str("memo"), None);
    }
}
