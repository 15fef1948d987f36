use std::path::Path;

use serde::Deserialize;

use crate::error::TimelineError;

/// Which audio track's timing governs word highlighting.
/// `Mix` denotes a single pre-mixed combined file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingTrack {
    Original,
    Translation,
    Mix,
}

impl TimingTrack {
    pub fn is_original(self) -> bool {
        matches!(self, Self::Original)
    }
}

/// One of the independently revealable text tracks of a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Original,
    Translation,
    Transliteration,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WordToken {
    pub text: String,
    /// Absolute audio-file seconds. Invariant: `start_time <= end_time`.
    #[serde(rename = "startTime")]
    pub start_time: f64,
    #[serde(rename = "endTime")]
    pub end_time: f64,
}

/// Marks how many translation tokens are cumulatively revealed by the end
/// of this duration-weighted event. Derived from timed speech-synthesis
/// events; used for non-uniform per-token reveal spacing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhaseEvent {
    pub duration: f64,
    #[serde(rename = "translationCumulativeIndex")]
    pub translation_cumulative_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct PhaseDurations {
    #[serde(default)]
    pub original: f64,
    #[serde(default)]
    pub gap: f64,
    #[serde(default)]
    pub translation: f64,
    #[serde(default)]
    pub tail: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    /// 0-based position within the chunk.
    pub index: usize,
    /// Global sentence number shown to the reader, when known.
    #[serde(default)]
    pub display_number: Option<u32>,
    #[serde(default)]
    pub original_tokens: Vec<String>,
    #[serde(default)]
    pub translation_tokens: Vec<String>,
    #[serde(default)]
    pub transliteration_tokens: Vec<String>,
    /// Translation-track word timings, absolute audio-file seconds.
    #[serde(default)]
    pub timing_tokens: Vec<WordToken>,
    /// Original-track word timings, absolute audio-file seconds.
    #[serde(default)]
    pub original_timing_tokens: Vec<WordToken>,
    #[serde(default)]
    pub timeline_events: Vec<PhaseEvent>,
    #[serde(default)]
    pub total_duration: Option<f64>,
    #[serde(default)]
    pub phase_durations: Option<PhaseDurations>,
    /// Absolute translation-track sentence bounds.
    #[serde(default)]
    pub start_gate: Option<f64>,
    #[serde(default)]
    pub end_gate: Option<f64>,
    /// Absolute original-track sentence bounds.
    #[serde(default)]
    pub original_start_gate: Option<f64>,
    #[serde(default)]
    pub original_end_gate: Option<f64>,
}

impl Sentence {
    pub fn tokens_for(&self, kind: VariantKind) -> &[String] {
        match kind {
            VariantKind::Original => &self.original_tokens,
            VariantKind::Translation => &self.translation_tokens,
            VariantKind::Transliteration => &self.transliteration_tokens,
        }
    }
}

/// Where a playback option's audio physically lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AudioSource {
    /// One physical file (plain track, or a pre-mixed combined file).
    Single {
        url: String,
        #[serde(default)]
        duration: Option<f64>,
    },
    /// Combined playback spliced at runtime from two physical files.
    Split {
        #[serde(rename = "originalUrl")]
        original_url: String,
        #[serde(rename = "translationUrl")]
        translation_url: String,
        #[serde(default, rename = "originalDuration")]
        original_duration: Option<f64>,
        #[serde(default, rename = "translationDuration")]
        translation_duration: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioOption {
    pub track: TimingTrack,
    pub source: AudioSource,
}

/// A playback unit (e.g. a book chapter): ordered sentences plus the audio
/// options they can be played against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: String,
    pub sentences: Vec<Sentence>,
    #[serde(default)]
    pub audio_options: Vec<AudioOption>,
}

impl Chunk {
    pub fn load(path: &Path) -> Result<Self, TimelineError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| TimelineError::io("read chunk metadata", e))?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self, TimelineError> {
        serde_json::from_str(data).map_err(|e| TimelineError::json("parse chunk metadata", e))
    }
}
