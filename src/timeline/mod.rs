pub mod builder;
pub mod cache;
pub mod components;
pub mod display;
mod reveal;

pub use builder::{build_timeline, SentenceRuntime, VariantRuntime};
pub use cache::TimelineCache;
pub use components::{compute_components, SentenceTimingComponents};
pub use display::{
    resolve_display, SentenceDisplay, SentenceState, TimelineDisplay, VariantDisplay,
};
