use std::collections::HashMap;
use std::sync::Arc;

use crate::config::TimelineConfig;
use crate::timeline::builder::{build_timeline, SentenceRuntime};
use crate::types::{Chunk, TimingTrack};

/// Rebuild when the audio duration a timeline was built against drifts by
/// more than this; the scale pass bakes the duration into the array.
const DURATION_DRIFT_TOLERANCE: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TimelineKey {
    chunk_id: String,
    active_track: TimingTrack,
    use_combined_phases: bool,
}

struct TimelineEntry {
    audio_duration: Option<f64>,
    runtimes: Arc<Vec<SentenceRuntime>>,
}

/// Memoizes built timelines so the builder runs on discrete events (chunk
/// change, track change) rather than per tick. Owned and mutated by the
/// main loop only.
#[derive(Default)]
pub struct TimelineCache {
    entries: HashMap<TimelineKey, TimelineEntry>,
}

impl TimelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached runtime array for this selection, building it if
    /// absent or if the audio duration has drifted since it was built.
    /// `None` only for chunks with no sentences.
    pub fn get_or_build(
        &mut self,
        chunk: &Chunk,
        active_track: TimingTrack,
        audio_duration: Option<f64>,
        use_combined_phases: bool,
        config: &TimelineConfig,
    ) -> Option<Arc<Vec<SentenceRuntime>>> {
        let key = TimelineKey {
            chunk_id: chunk.id.clone(),
            active_track,
            use_combined_phases,
        };
        if let Some(entry) = self.entries.get(&key) {
            if duration_matches(entry.audio_duration, audio_duration) {
                return Some(Arc::clone(&entry.runtimes));
            }
            tracing::debug!(
                chunk_id = %chunk.id,
                "audio duration drifted; rebuilding cached timeline"
            );
        }
        let runtimes = Arc::new(build_timeline(
            &chunk.sentences,
            active_track,
            audio_duration,
            use_combined_phases,
            config,
        )?);
        self.entries.insert(
            key,
            TimelineEntry {
                audio_duration,
                runtimes: Arc::clone(&runtimes),
            },
        );
        Some(runtimes)
    }

    /// Drops every cached timeline for a chunk, e.g. when its metadata is
    /// refreshed.
    pub fn invalidate_chunk(&mut self, chunk_id: &str) {
        self.entries.retain(|key, _| key.chunk_id != chunk_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn duration_matches(cached: Option<f64>, requested: Option<f64>) -> bool {
    match (cached, requested) {
        (None, None) => true,
        (Some(a), Some(b)) => (a - b).abs() <= DURATION_DRIFT_TOLERANCE,
        _ => false,
    }
}
