pub mod config;
pub mod error;
pub mod sequence;
pub mod timeline;
pub mod transport;
pub mod types;

pub use config::TimelineConfig;
pub use error::TimelineError;
pub use sequence::{PhysicalTrack, SeekTarget, SequenceController, SequencePlan, TrackSwitch};
pub use timeline::{
    build_timeline, compute_components, resolve_display, SentenceRuntime, SentenceState,
    TimelineCache, TimelineDisplay,
};
pub use transport::Transport;
pub use types::{
    AudioOption, AudioSource, Chunk, PhaseDurations, PhaseEvent, Sentence, TimingTrack,
    VariantKind, WordToken,
};
