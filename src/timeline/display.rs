use crate::config::TimelineConfig;
use crate::timeline::builder::SentenceRuntime;
use crate::types::VariantKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceState {
    Past,
    Active,
    Future,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantDisplay {
    pub kind: VariantKind,
    pub tokens: Vec<String>,
    pub revealed_count: usize,
    pub current_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentenceDisplay {
    pub index: usize,
    pub display_number: Option<u32>,
    pub state: SentenceState,
    pub variants: Vec<VariantDisplay>,
}

/// Renderable snapshot for one playback instant. Ephemeral; recomputed on
/// every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineDisplay {
    /// Position of the active sentence in the runtime array.
    pub active_index: usize,
    pub effective_time: f64,
    pub sentences: Vec<SentenceDisplay>,
}

/// Maps a wall-clock chunk time onto per-sentence, per-variant reveal
/// state. Pure function of its arguments; safe to call on every animation
/// frame.
pub fn resolve_display(
    runtimes: &[SentenceRuntime],
    chunk_time: f64,
    audio_duration: Option<f64>,
    config: &TimelineConfig,
) -> Option<TimelineDisplay> {
    if runtimes.is_empty() {
        return None;
    }

    let total = runtimes.iter().fold(0.0f64, |acc, r| acc.max(r.end_time));
    let effective_time = effective_time(chunk_time, audio_duration, total, config);
    let active_index = active_sentence_index(runtimes, effective_time, config);

    let mut sentences = Vec::with_capacity(runtimes.len());
    for (position, runtime) in runtimes.iter().enumerate() {
        if !runtime.has_visible_variant() {
            continue;
        }
        let state = if position < active_index {
            SentenceState::Past
        } else if position == active_index {
            SentenceState::Active
        } else {
            SentenceState::Future
        };
        let variants = runtime
            .variants
            .iter()
            .map(|variant| {
                resolve_variant(
                    variant.kind,
                    &variant.tokens,
                    &variant.reveal_times,
                    state,
                    runtime.start_time,
                    runtime.end_time,
                    effective_time,
                    config,
                )
            })
            .collect();
        sentences.push(SentenceDisplay {
            index: runtime.index,
            display_number: runtime.display_number,
            state,
            variants,
        });
    }

    Some(TimelineDisplay {
        active_index,
        effective_time,
        sentences,
    })
}

/// Guards against small floating drift between timeline units and the real
/// audio clock while still correcting larger mismatches (e.g. timing built
/// for a different audio variant).
fn effective_time(
    chunk_time: f64,
    audio_duration: Option<f64>,
    total: f64,
    config: &TimelineConfig,
) -> f64 {
    let (low, high) = config.scale_ratio_window;
    match audio_duration {
        Some(duration) if duration > 0.0 && total > 0.0 => {
            let ratio = total / duration;
            if ratio >= low && ratio <= high {
                chunk_time.clamp(0.0, total)
            } else {
                (chunk_time / duration * total).clamp(0.0, total)
            }
        }
        // Missing audio duration: use the raw chunk time unscaled.
        _ => chunk_time.clamp(0.0, total.max(0.0)),
    }
}

fn active_sentence_index(
    runtimes: &[SentenceRuntime],
    effective_time: f64,
    config: &TimelineConfig,
) -> usize {
    let eps = config.boundary_epsilon;
    runtimes
        .iter()
        .position(|r| effective_time >= r.start_time - eps && effective_time <= r.end_time + eps)
        .or_else(|| {
            // Past everything: the last sentence already finished.
            runtimes.iter().rposition(|r| r.end_time < effective_time)
        })
        // Nothing started yet.
        .unwrap_or(0)
}

#[allow(clippy::too_many_arguments)]
fn resolve_variant(
    kind: VariantKind,
    tokens: &[String],
    reveal_times: &[f64],
    state: SentenceState,
    start_time: f64,
    end_time: f64,
    effective_time: f64,
    config: &TimelineConfig,
) -> VariantDisplay {
    let count = tokens.len();
    let eps = config.boundary_epsilon;
    let at_boundary = effective_time >= end_time - config.dwell_tolerance;

    let mut revealed = if state == SentenceState::Past {
        count
    } else {
        let cutoff = effective_time.min(end_time) + eps;
        reveal_times.iter().filter(|&&t| t <= cutoff).count()
    };
    // The last word must not visually lag during the inter-segment dwell.
    if at_boundary {
        revealed = count;
    }
    revealed = revealed.min(count);
    // Avoid a "nothing highlighted yet" flash right at sentence start.
    if state == SentenceState::Active
        && revealed == 0
        && count > 0
        && effective_time >= start_time - eps
    {
        revealed = 1;
    }

    let current_index = if (state == SentenceState::Past || at_boundary) && count > 0 {
        Some(count - 1)
    } else if revealed > 0 {
        Some(revealed - 1)
    } else {
        None
    };

    VariantDisplay {
        kind,
        tokens: tokens.to_vec(),
        revealed_count: revealed,
        current_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::builder::{SentenceRuntime, VariantRuntime};

    fn runtime(index: usize, start: f64, end: f64, reveal_times: Vec<f64>) -> SentenceRuntime {
        let tokens = (0..reveal_times.len()).map(|i| format!("w{i}")).collect();
        SentenceRuntime {
            index,
            display_number: None,
            start_time: start,
            end_time: end,
            variants: vec![VariantRuntime {
                kind: VariantKind::Original,
                tokens,
                reveal_times,
            }],
        }
    }

    fn two_sentences() -> Vec<SentenceRuntime> {
        vec![
            runtime(0, 0.0, 1.05, vec![0.0, 0.35, 0.70]),
            runtime(1, 1.05, 2.10, vec![1.05, 1.40, 1.75]),
        ]
    }

    #[test]
    fn empty_runtimes_yield_no_display() {
        assert!(resolve_display(&[], 0.0, None, &TimelineConfig::default()).is_none());
    }

    #[test]
    fn mid_sentence_reveal_count_and_current_index() {
        let display = resolve_display(&two_sentences(), 0.5, None, &TimelineConfig::default())
            .expect("display");
        assert_eq!(display.active_index, 0);
        let variant = &display.sentences[0].variants[0];
        assert_eq!(variant.revealed_count, 2);
        assert_eq!(variant.current_index, Some(1));
    }

    #[test]
    fn past_sentences_are_fully_revealed() {
        let display = resolve_display(&two_sentences(), 1.5, None, &TimelineConfig::default())
            .expect("display");
        assert_eq!(display.active_index, 1);
        let past = &display.sentences[0];
        assert_eq!(past.state, SentenceState::Past);
        assert_eq!(past.variants[0].revealed_count, 3);
        assert_eq!(past.variants[0].current_index, Some(2));
    }

    #[test]
    fn future_sentences_reveal_nothing() {
        let display = resolve_display(&two_sentences(), 0.2, None, &TimelineConfig::default())
            .expect("display");
        let future = &display.sentences[1];
        assert_eq!(future.state, SentenceState::Future);
        assert_eq!(future.variants[0].revealed_count, 0);
        assert_eq!(future.variants[0].current_index, None);
    }

    #[test]
    fn first_word_revealed_immediately_at_sentence_start() {
        // Reveal times start strictly after the sentence start.
        let runtimes = vec![runtime(0, 0.0, 2.0, vec![0.5, 1.0, 1.5])];
        let display =
            resolve_display(&runtimes, 0.0, None, &TimelineConfig::default()).expect("display");
        let variant = &display.sentences[0].variants[0];
        assert_eq!(variant.revealed_count, 1);
        assert_eq!(variant.current_index, Some(0));
    }

    #[test]
    fn boundary_dwell_forces_full_reveal() {
        // Last reveal sits at the very end; just inside the dwell window the
        // whole sentence must already read as revealed.
        let runtimes = vec![runtime(0, 0.0, 2.0, vec![0.0, 1.0, 1.99])];
        let display =
            resolve_display(&runtimes, 1.9, None, &TimelineConfig::default()).expect("display");
        let variant = &display.sentences[0].variants[0];
        assert_eq!(variant.revealed_count, 3);
        assert_eq!(variant.current_index, Some(2));
    }

    #[test]
    fn time_past_everything_selects_last_sentence() {
        let display = resolve_display(&two_sentences(), 99.0, None, &TimelineConfig::default())
            .expect("display");
        assert_eq!(display.active_index, 1);
        assert!((display.effective_time - 2.10).abs() < 1e-9);
    }

    #[test]
    fn time_before_everything_selects_first_sentence() {
        let runtimes = vec![runtime(0, 5.0, 6.0, vec![5.0, 5.5])];
        let display =
            resolve_display(&runtimes, 0.0, None, &TimelineConfig::default()).expect("display");
        assert_eq!(display.active_index, 0);
        assert_eq!(display.sentences[0].variants[0].revealed_count, 0);
    }

    #[test]
    fn drift_within_window_keeps_chunk_time() {
        // Timeline total 2.10 vs audio 2.11: within the 2% window.
        let display = resolve_display(
            &two_sentences(),
            0.5,
            Some(2.11),
            &TimelineConfig::default(),
        )
        .expect("display");
        assert!((display.effective_time - 0.5).abs() < 1e-9);
    }

    #[test]
    fn large_mismatch_rescales_chunk_time() {
        // Audio is twice the timeline: half-way through audio maps to
        // half-way through the timeline.
        let display = resolve_display(
            &two_sentences(),
            2.10,
            Some(4.20),
            &TimelineConfig::default(),
        )
        .expect("display");
        assert!((display.effective_time - 1.05).abs() < 1e-9);
    }

    #[test]
    fn resolve_is_idempotent() {
        let runtimes = two_sentences();
        let a = resolve_display(&runtimes, 1.3, Some(2.10), &TimelineConfig::default());
        let b = resolve_display(&runtimes, 1.3, Some(2.10), &TimelineConfig::default());
        assert_eq!(a, b);
    }

    #[test]
    fn active_index_is_monotonic_in_time() {
        let runtimes = two_sentences();
        let config = TimelineConfig::default();
        let mut previous = 0usize;
        for step in 0..=42 {
            let time = step as f64 * 0.05;
            let display = resolve_display(&runtimes, time, None, &config).expect("display");
            assert!(display.active_index >= previous, "regressed at t={time}");
            previous = display.active_index;
        }
    }

    #[test]
    fn sentences_without_visible_variants_are_omitted() {
        let mut empty = runtime(0, 0.0, 1.0, vec![]);
        empty.variants.clear();
        let runtimes = vec![empty, runtime(1, 1.0, 2.0, vec![1.0, 1.5])];
        let display =
            resolve_display(&runtimes, 0.5, None, &TimelineConfig::default()).expect("display");
        assert_eq!(display.sentences.len(), 1);
        assert_eq!(display.sentences[0].index, 1);
    }
}
