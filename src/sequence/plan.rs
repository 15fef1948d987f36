use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::timeline::components::compute_components;
use crate::types::{Sentence, TimingTrack};

/// One of the two physical files backing a split combined track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalTrack {
    Original,
    Translation,
}

/// Maps one sentence phase onto a span of a physical file and a span of
/// the combined logical timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSegment {
    pub sentence_index: usize,
    pub track: PhysicalTrack,
    /// Start of this phase within its physical file, in seconds.
    pub file_offset: f64,
    pub duration: f64,
    /// Start of this phase on the combined logical timeline.
    pub logical_start: f64,
}

/// Per-sentence segment plan for presenting two physical files as one
/// continuous combined track.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencePlan {
    pub segments: Vec<PlanSegment>,
    pub original_url: String,
    pub translation_url: String,
    /// True when at least one sentence boundary requires a track switch.
    pub is_enabled: bool,
    pub total_logical_duration: f64,
}

impl SequencePlan {
    pub fn url_for(&self, track: PhysicalTrack) -> &str {
        match track {
            PhysicalTrack::Original => &self.original_url,
            PhysicalTrack::Translation => &self.translation_url,
        }
    }
}

/// Builds the segment plan: per sentence, an original-phase segment from
/// the original file followed by a translation-phase segment from the
/// translation file, with estimated per-file offsets rescaled against the
/// true file durations when those are known.
pub fn build_plan(
    sentences: &[Sentence],
    original_url: &str,
    translation_url: &str,
    original_duration: Option<f64>,
    translation_duration: Option<f64>,
    config: &TimelineConfig,
) -> Result<SequencePlan, TimelineError> {
    if sentences.is_empty() {
        return Err(TimelineError::invalid_input(
            "cannot build a sequence plan for an empty chunk",
        ));
    }
    if original_url.is_empty() || translation_url.is_empty() {
        return Err(TimelineError::invalid_input(
            "split combined playback requires both file URLs",
        ));
    }

    struct RawSegment {
        sentence_index: usize,
        track: PhysicalTrack,
        file_offset: f64,
        duration: f64,
        gap_after: f64,
    }

    let mut raw = Vec::new();
    let mut original_cursor = 0.0f64;
    let mut translation_cursor = 0.0f64;
    for sentence in sentences {
        let comps = compute_components(sentence, TimingTrack::Mix, true, config);
        if comps.original_phase_duration > 0.0 {
            raw.push(RawSegment {
                sentence_index: sentence.index,
                track: PhysicalTrack::Original,
                file_offset: original_cursor,
                duration: comps.original_phase_duration,
                gap_after: comps.gap_duration,
            });
            original_cursor += comps.original_phase_duration;
        }
        if comps.translation_total_duration > 0.0 {
            raw.push(RawSegment {
                sentence_index: sentence.index,
                track: PhysicalTrack::Translation,
                file_offset: translation_cursor,
                duration: comps.translation_total_duration,
                gap_after: 0.0,
            });
            translation_cursor += comps.translation_total_duration;
        }
    }

    // Estimated per-file offsets are reconciled against the real file
    // lengths the same way the timeline scale pass reconciles chunk time.
    let original_scale = file_scale(original_duration, original_cursor);
    let translation_scale = file_scale(translation_duration, translation_cursor);
    if original_scale != 1.0 || translation_scale != 1.0 {
        tracing::debug!(
            original_scale,
            translation_scale,
            "rescaling sequence plan offsets to physical file durations"
        );
    }

    let mut segments = Vec::with_capacity(raw.len());
    let mut logical_cursor = 0.0f64;
    for segment in raw {
        let scale = match segment.track {
            PhysicalTrack::Original => original_scale,
            PhysicalTrack::Translation => translation_scale,
        };
        let duration = segment.duration * scale;
        segments.push(PlanSegment {
            sentence_index: segment.sentence_index,
            track: segment.track,
            file_offset: segment.file_offset * scale,
            duration,
            logical_start: logical_cursor,
        });
        logical_cursor += duration + segment.gap_after;
    }

    let is_enabled = segments
        .windows(2)
        .any(|pair| pair[0].track != pair[1].track);

    Ok(SequencePlan {
        segments,
        original_url: original_url.to_string(),
        translation_url: translation_url.to_string(),
        is_enabled,
        total_logical_duration: logical_cursor,
    })
}

fn file_scale(actual_duration: Option<f64>, estimated_total: f64) -> f64 {
    match actual_duration {
        Some(actual) if actual > 0.0 && estimated_total > 0.0 => actual / estimated_total,
        _ => 1.0,
    }
}
