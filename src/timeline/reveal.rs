use crate::types::{PhaseEvent, WordToken};

/// Uniform reveal spacing: token `i` reveals at `start + i * (duration / count)`.
pub(crate) fn uniform_reveal_times(start: f64, duration: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let step = duration / count as f64;
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Absolute word-timing passthrough. Falls back to uniform distribution when
/// the timing-token count does not match the text-token count.
pub(crate) fn absolute_reveal_times(
    timing_tokens: &[WordToken],
    token_count: usize,
    fallback_start: f64,
    fallback_duration: f64,
    track_label: &'static str,
) -> Vec<f64> {
    if timing_tokens.len() == token_count {
        return timing_tokens.iter().map(|t| t.start_time).collect();
    }
    tracing::warn!(
        track = track_label,
        timing_tokens = timing_tokens.len(),
        text_tokens = token_count,
        "timing token count mismatch; regenerating uniform reveal times"
    );
    uniform_reveal_times(fallback_start, fallback_duration, token_count)
}

/// Converts duration-weighted synthesis events into per-token reveal times.
///
/// Each event claims `duration` seconds and raises the cumulative revealed
/// count to `translation_cumulative_index` (clamped, never decreasing); the
/// delta tokens split the event duration evenly. Tokens never claimed by an
/// event reveal at the end of the event span.
pub(crate) fn event_reveal_times(
    events: &[PhaseEvent],
    token_count: usize,
    start: f64,
) -> Vec<f64> {
    let mut times = Vec::with_capacity(token_count);
    let mut cursor = start;
    let mut revealed = 0usize;
    for event in events {
        let cumulative = revealed.max(event.translation_cumulative_index).min(token_count);
        let delta = cumulative - revealed;
        let duration = event.duration.max(0.0);
        if delta == 0 {
            cursor += duration;
            continue;
        }
        let step = duration / delta as f64;
        for _ in 0..delta {
            times.push(cursor);
            cursor += step;
        }
        revealed = cumulative;
    }
    while times.len() < token_count {
        times.push(cursor);
    }
    times
}

/// Derives transliteration reveal times by mapping each transliteration
/// token index proportionally onto the translation reveal array
/// (nearest-index interpolation by ratio).
pub(crate) fn map_transliteration_times(
    transliteration_count: usize,
    translation_times: &[f64],
) -> Vec<f64> {
    if transliteration_count == 0 || translation_times.is_empty() {
        return Vec::new();
    }
    let last_source = translation_times.len() - 1;
    (0..transliteration_count)
        .map(|i| {
            let ratio = if transliteration_count > 1 {
                i as f64 / (transliteration_count - 1) as f64
            } else {
                0.0
            };
            let source = (ratio * last_source as f64).round() as usize;
            translation_times[source.min(last_source)]
        })
        .collect()
}

/// Pins the first reveal to the track start and (when more than one token)
/// the last reveal to the track end. Not applied in absolute-timing mode,
/// where values are already true audio timestamps.
pub(crate) fn pin_bounds(times: &mut [f64], start: f64, end: f64) {
    if let Some(first) = times.first_mut() {
        *first = start;
    }
    if times.len() > 1 {
        if let Some(last) = times.last_mut() {
            *last = end;
        }
    }
}
