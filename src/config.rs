/// Tunable timing assumptions for timeline construction and display.
///
/// These were implicit literals in earlier revisions; keeping them on a
/// config struct lets the builder and resolver be exercised under
/// different assumptions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    /// Estimated seconds per token when no timing source is available.
    pub token_duration: f64,
    /// Last-resort sentence duration when even token counts are empty.
    pub fallback_sentence_duration: f64,
    /// Pause held at a segment boundary; also the window in which the last
    /// word is force-revealed.
    pub dwell_tolerance: f64,
    /// Tolerance for sentence-bound containment and reveal comparisons.
    pub boundary_epsilon: f64,
    /// Timeline/audio duration ratio band treated as floating drift rather
    /// than a genuine mismatch requiring rescaling.
    pub scale_ratio_window: (f64, f64),
}

impl TimelineConfig {
    pub const DEFAULT_TOKEN_DURATION: f64 = 0.35;
    pub const DEFAULT_FALLBACK_SENTENCE_DURATION: f64 = 0.5;
    pub const DEFAULT_DWELL_TOLERANCE: f64 = 0.15;
    pub const DEFAULT_BOUNDARY_EPSILON: f64 = 1e-3;
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            token_duration: Self::DEFAULT_TOKEN_DURATION,
            fallback_sentence_duration: Self::DEFAULT_FALLBACK_SENTENCE_DURATION,
            dwell_tolerance: Self::DEFAULT_DWELL_TOLERANCE,
            boundary_epsilon: Self::DEFAULT_BOUNDARY_EPSILON,
            scale_ratio_window: (0.98, 1.02),
        }
    }
}
