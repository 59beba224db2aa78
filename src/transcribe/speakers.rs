//! Silence-gap speaker segmentation.
//!
//! A coarse placeholder, not speaker identification: consecutive segments
//! separated by more than the gap threshold get a new incrementing label.
//! Recurring speakers are never re-identified and no confidence is
//! attached.

use super::backend::TranscriptSegment;

/// Silence gap (seconds) that triggers a speaker change.
pub const SPEAKER_GAP_SECS: f64 = 2.0;

/// Assign "Speaker N" labels in place based on silence gaps.
pub fn assign_speakers(segments: &mut [TranscriptSegment]) {
    let mut speaker_id = 1u32;
    let mut last_end = 0.0f64;

    for segment in segments.iter_mut() {
        if segment.start - last_end > SPEAKER_GAP_SECS {
            speaker_id += 1;
        }
        segment.speaker = Some(format!("Speaker {}", speaker_id));
        last_end = segment.end;
    }
}

/// Format a transcript grouping consecutive segments by speaker.
pub fn format_with_speakers(segments: &[TranscriptSegment]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_speaker: Option<&str> = None;
    let mut current_text: Vec<&str> = Vec::new();

    for segment in segments {
        let speaker = segment.speaker.as_deref().unwrap_or("Unknown");
        if Some(speaker) != current_speaker {
            if let Some(prev) = current_speaker {
                lines.push(format!("\n{}:", prev));
                lines.push(current_text.join(" "));
            }
            current_speaker = Some(speaker);
            current_text = vec![segment.text.trim()];
        } else {
            current_text.push(segment.text.trim());
        }
    }

    if let Some(prev) = current_speaker {
        lines.push(format!("\n{}:", prev));
        lines.push(current_text.join(" "));
    }

    lines.join("\n")
}
