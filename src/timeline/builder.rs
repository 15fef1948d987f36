use crate::config::TimelineConfig;
use crate::timeline::components::compute_components;
use crate::timeline::reveal;
use crate::types::{Sentence, TimingTrack, VariantKind};

/// One text track of a built sentence: its tokens and the timeline instant
/// at which each token is considered spoken.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRuntime {
    pub kind: VariantKind,
    pub tokens: Vec<String>,
    pub reveal_times: Vec<f64>,
}

/// A sentence placed on the chunk timeline. Immutable once built; consumed
/// by the display resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRuntime {
    pub index: usize,
    pub display_number: Option<u32>,
    pub start_time: f64,
    pub end_time: f64,
    pub variants: Vec<VariantRuntime>,
}

impl SentenceRuntime {
    pub fn variant(&self, kind: VariantKind) -> Option<&VariantRuntime> {
        self.variants.iter().find(|v| v.kind == kind)
    }

    pub fn has_visible_variant(&self) -> bool {
        self.variants.iter().any(|v| !v.tokens.is_empty())
    }
}

/// Which timing source placed a sentence on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimingMode {
    AbsoluteOriginal,
    AbsoluteTranslation,
    Relative,
}

/// Builds the full per-chunk timeline: sequential sentence spans plus
/// per-variant reveal-time arrays, globally scaled against the true audio
/// duration when every sentence used estimated timing.
///
/// Returns `None` only when `sentences` is empty.
pub fn build_timeline(
    sentences: &[Sentence],
    active_track: TimingTrack,
    audio_duration: Option<f64>,
    use_combined_phases: bool,
    config: &TimelineConfig,
) -> Option<Vec<SentenceRuntime>> {
    if sentences.is_empty() {
        return None;
    }

    let mut runtimes = Vec::with_capacity(sentences.len());
    let mut offset = 0.0f64;
    let mut used_absolute = false;
    let mut used_relative = false;

    for sentence in sentences {
        let comps = compute_components(sentence, active_track, use_combined_phases, config);
        let mode = timing_mode(sentence, active_track);
        match mode {
            TimingMode::Relative => used_relative = true,
            _ => used_absolute = true,
        }

        let start_time = match mode {
            TimingMode::AbsoluteOriginal => sentence.original_start_gate.unwrap_or(offset),
            TimingMode::AbsoluteTranslation => sentence.start_gate.unwrap_or(offset),
            TimingMode::Relative => offset,
        };
        let translation_track_start = start_time + comps.translation_track_start_offset;

        let mut variants = Vec::new();

        if comps.highlight_original {
            let count = sentence.original_tokens.len();
            let reveal_times = if mode == TimingMode::AbsoluteOriginal {
                reveal::absolute_reveal_times(
                    &sentence.original_timing_tokens,
                    count,
                    start_time,
                    comps.original_phase_duration,
                    "original",
                )
            } else {
                reveal::uniform_reveal_times(start_time, comps.original_phase_duration, count)
            };
            variants.push(VariantRuntime {
                kind: VariantKind::Original,
                tokens: sentence.original_tokens.clone(),
                reveal_times,
            });
        }

        let mut translation_times: Vec<f64> = Vec::new();
        if !active_track.is_original() && !sentence.translation_tokens.is_empty() {
            let count = sentence.translation_tokens.len();
            let mut reveal_times = if mode == TimingMode::AbsoluteTranslation {
                reveal::absolute_reveal_times(
                    &sentence.timing_tokens,
                    count,
                    translation_track_start,
                    comps.translation_speech_duration,
                    "translation",
                )
            } else if !sentence.timeline_events.is_empty() {
                reveal::event_reveal_times(
                    &sentence.timeline_events,
                    count,
                    translation_track_start,
                )
            } else {
                reveal::uniform_reveal_times(
                    translation_track_start,
                    comps.translation_speech_duration,
                    count,
                )
            };
            if mode != TimingMode::AbsoluteTranslation {
                reveal::pin_bounds(
                    &mut reveal_times,
                    translation_track_start,
                    translation_track_start + comps.translation_total_duration,
                );
            }
            translation_times = reveal_times.clone();
            variants.push(VariantRuntime {
                kind: VariantKind::Translation,
                tokens: sentence.translation_tokens.clone(),
                reveal_times,
            });
        }

        if !active_track.is_original() && !sentence.transliteration_tokens.is_empty() {
            let count = sentence.transliteration_tokens.len();
            let mut reveal_times = if translation_times.is_empty() {
                // No translation source to map onto; fall back to uniform
                // spacing over the translation phase.
                reveal::uniform_reveal_times(
                    translation_track_start,
                    comps.translation_speech_duration,
                    count,
                )
            } else {
                reveal::map_transliteration_times(count, &translation_times)
            };
            if mode != TimingMode::AbsoluteTranslation {
                reveal::pin_bounds(
                    &mut reveal_times,
                    translation_track_start,
                    translation_track_start + comps.translation_total_duration,
                );
            }
            variants.push(VariantRuntime {
                kind: VariantKind::Transliteration,
                tokens: sentence.transliteration_tokens.clone(),
                reveal_times,
            });
        }

        let end_time = match mode {
            TimingMode::AbsoluteOriginal => sentence
                .original_end_gate
                .unwrap_or(start_time + comps.total_sentence_duration),
            TimingMode::AbsoluteTranslation => sentence
                .end_gate
                .unwrap_or(start_time + comps.total_sentence_duration),
            TimingMode::Relative => start_time + comps.total_sentence_duration,
        };

        // Absolute-timed sentences carry true audio timestamps; only
        // relative sentences feed the running accumulator.
        if mode == TimingMode::Relative {
            offset = end_time;
        }

        runtimes.push(SentenceRuntime {
            index: sentence.index,
            display_number: sentence.display_number,
            start_time,
            end_time,
            variants,
        });
    }

    if used_absolute && used_relative {
        tracing::warn!(
            track = ?active_track,
            "chunk mixes absolute-gate and estimated sentence timing; skipping scale pass"
        );
    }

    if !use_combined_phases && !used_absolute {
        if let Some(duration) = audio_duration {
            let total = runtimes
                .iter()
                .fold(0.0f64, |acc, r| acc.max(r.end_time));
            if duration > 0.0 && total > 0.0 {
                let scale = duration / total;
                tracing::debug!(scale, total, duration, "scaling estimated timeline to audio duration");
                for runtime in &mut runtimes {
                    runtime.start_time *= scale;
                    runtime.end_time *= scale;
                    for variant in &mut runtime.variants {
                        for time in &mut variant.reveal_times {
                            *time *= scale;
                        }
                    }
                }
            }
        }
    }

    Some(runtimes)
}

fn timing_mode(sentence: &Sentence, active_track: TimingTrack) -> TimingMode {
    if active_track.is_original() {
        if sentence.original_start_gate.is_some()
            && sentence.original_end_gate.is_some()
            && !sentence.original_timing_tokens.is_empty()
        {
            return TimingMode::AbsoluteOriginal;
        }
    } else if sentence.start_gate.is_some()
        && sentence.end_gate.is_some()
        && !sentence.timing_tokens.is_empty()
    {
        return TimingMode::AbsoluteTranslation;
    }
    TimingMode::Relative
}
