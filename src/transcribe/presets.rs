//! Named transcription presets bundling backend and model size.

use serde::Serialize;

use super::backend::TranscriberKind;

/// A named bundle of transcription backend + quality settings.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionPreset {
    pub name: &'static str,
    pub backend: TranscriberKind,
    pub model: &'static str,
    pub description: &'static str,
}

/// All presets offered to callers.
pub const PRESETS: &[TranscriptionPreset] = &[
    TranscriptionPreset {
        name: "fast",
        backend: TranscriberKind::WhisperLocal,
        model: "tiny",
        description: "Fastest, lower accuracy",
    },
    TranscriptionPreset {
        name: "balanced",
        backend: TranscriberKind::WhisperLocal,
        model: "base",
        description: "Good balance of speed and accuracy",
    },
    TranscriptionPreset {
        name: "accurate",
        backend: TranscriberKind::WhisperLocal,
        model: "small",
        description: "Better accuracy, slower",
    },
    TranscriptionPreset {
        name: "high_quality",
        backend: TranscriberKind::WhisperLocal,
        model: "medium",
        description: "High accuracy, requires GPU",
    },
    TranscriptionPreset {
        name: "api",
        backend: TranscriberKind::WhisperApi,
        model: "whisper-1",
        description: "OpenAI API (requires API key)",
    },
];

/// Look up a preset by name.
pub fn get(name: &str) -> Option<&'static TranscriptionPreset> {
    PRESETS.iter().find(|p| p.name == name)
}

/// Look up a preset, falling back to `balanced` for unknown names.
pub fn get_or_balanced(name: &str) -> &'static TranscriptionPreset {
    get(name).unwrap_or_else(|| get("balanced").expect("balanced preset exists"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_presets() {
        assert_eq!(get("fast").unwrap().model, "tiny");
        assert_eq!(get("api").unwrap().backend, TranscriberKind::WhisperApi);
        assert!(get("ultra").is_none());
    }

    #[test]
    fn test_unknown_preset_falls_back_to_balanced() {
        let preset = get_or_balanced("nope");
        assert_eq!(preset.name, "balanced");
        assert_eq!(preset.model, "base");
    }
}
