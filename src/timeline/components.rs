use crate::config::TimelineConfig;
use crate::types::{Sentence, TimingTrack};

/// Per-sentence duration/timing breakdown, recomputed on every timeline
/// build and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentenceTimingComponents {
    pub is_original_track: bool,
    pub original_phase_duration: f64,
    pub gap_duration: f64,
    pub tail_duration: f64,
    pub translation_speech_duration: f64,
    pub translation_total_duration: f64,
    /// Offset of the translation phase from sentence start; non-zero only
    /// in combined-phase playback.
    pub translation_track_start_offset: f64,
    pub highlight_original: bool,
    pub total_sentence_duration: f64,
}

/// Resolves a sentence's timing breakdown from whichever timing source is
/// available, with strict fallback precedence. Pure and deterministic.
pub fn compute_components(
    sentence: &Sentence,
    active_track: TimingTrack,
    use_combined_phases: bool,
    config: &TimelineConfig,
) -> SentenceTimingComponents {
    let is_original_track = active_track.is_original();

    let original_phase_duration = resolve_original_phase(sentence, is_original_track, config);
    let gap_duration = sentence
        .phase_durations
        .map(|p| p.gap.max(0.0))
        .unwrap_or(0.0);
    let tail_duration = sentence
        .phase_durations
        .map(|p| p.tail.max(0.0))
        .unwrap_or(0.0);

    let translation_phase_duration = if is_original_track {
        0.0
    } else {
        resolve_translation_phase(sentence, config)
    };

    let events_total: f64 = sentence.timeline_events.iter().map(|e| e.duration.max(0.0)).sum();
    let translation_speech_duration = if !is_original_track && !sentence.timeline_events.is_empty()
    {
        events_total
    } else {
        translation_phase_duration
    };
    let translation_total_duration = translation_speech_duration + tail_duration;

    let highlight_original = (use_combined_phases || is_original_track)
        && !sentence.original_tokens.is_empty()
        && original_phase_duration > 0.0;

    let translation_track_start_offset = if use_combined_phases {
        original_phase_duration + gap_duration
    } else {
        0.0
    };

    let total_sentence_duration = if use_combined_phases {
        original_phase_duration + gap_duration + translation_total_duration
    } else if is_original_track {
        original_phase_duration
    } else {
        translation_total_duration
    };

    SentenceTimingComponents {
        is_original_track,
        original_phase_duration,
        gap_duration,
        tail_duration,
        translation_speech_duration,
        translation_total_duration,
        translation_track_start_offset,
        highlight_original,
        total_sentence_duration,
    }
}

fn resolve_original_phase(
    sentence: &Sentence,
    is_original_track: bool,
    config: &TimelineConfig,
) -> f64 {
    if let Some(phases) = sentence.phase_durations {
        if phases.original > 0.0 {
            return phases.original;
        }
    }
    if is_original_track {
        if let (Some(start), Some(end)) = (sentence.original_start_gate, sentence.original_end_gate)
        {
            let span = end - start;
            if span > 0.0 {
                return span;
            }
        }
    }
    sentence.original_tokens.len() as f64 * config.token_duration
}

fn resolve_translation_phase(sentence: &Sentence, config: &TimelineConfig) -> f64 {
    if let Some(phases) = sentence.phase_durations {
        if phases.translation > 0.0 {
            return phases.translation;
        }
    }
    if let Some(total) = sentence.total_duration {
        if total > 0.0 {
            return total;
        }
    }
    let events_total: f64 = sentence.timeline_events.iter().map(|e| e.duration.max(0.0)).sum();
    if events_total > 0.0 {
        return events_total;
    }
    let token_count = sentence
        .translation_tokens
        .len()
        .max(sentence.transliteration_tokens.len());
    if token_count > 0 {
        return token_count as f64 * config.token_duration;
    }
    tracing::debug!(
        sentence_index = sentence.index,
        "no translation timing source; using fallback sentence duration"
    );
    config.fallback_sentence_duration
}
