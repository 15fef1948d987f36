pub mod plan;

pub use plan::{build_plan, PhysicalTrack, PlanSegment, SequencePlan};

use crate::config::TimelineConfig;
use crate::error::TimelineError;
use crate::transport::Transport;
use crate::types::Sentence;

/// Transport ticks arriving after a transition's expected seek time are
/// accepted once they land within this window of it.
const SETTLE_WINDOW: f64 = 0.5;

/// A request for the caller to load the other physical file and seek.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSwitch {
    pub track: PhysicalTrack,
    pub url: String,
    pub seek_time: f64,
}

/// Resume/jump target for a sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekTarget {
    pub track: PhysicalTrack,
    pub url: String,
    pub time: f64,
}

/// Token identifying one transition bracket; a newer `begin_transition`
/// supersedes any older open bracket (last-writer-wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionToken(u64);

/// Drives combined playback spliced from two physical files. Pull-based:
/// the owner calls `update_for_time` on every transport tick and applies
/// the returned switch, bracketing the file load/seek with
/// `begin_transition`/`end_transition` so mid-switch transport times are
/// not fed to the display resolver.
pub struct SequenceController {
    config: TimelineConfig,
    plan: Option<SequencePlan>,
    current_segment: usize,
    generation: u64,
    open_transition: Option<u64>,
    pending_expectation: Option<f64>,
}

impl SequenceController {
    pub fn new(config: TimelineConfig) -> Self {
        Self {
            config,
            plan: None,
            current_segment: 0,
            generation: 0,
            open_transition: None,
            pending_expectation: None,
        }
    }

    /// Builds and installs the segment plan for a chunk backed by two
    /// physical files. Resets the segment pointer and any open transition.
    pub fn build_plan(
        &mut self,
        sentences: &[Sentence],
        original_url: &str,
        translation_url: &str,
        original_duration: Option<f64>,
        translation_duration: Option<f64>,
    ) -> Result<&SequencePlan, TimelineError> {
        let plan = plan::build_plan(
            sentences,
            original_url,
            translation_url,
            original_duration,
            translation_duration,
            &self.config,
        )?;
        self.current_segment = 0;
        self.open_transition = None;
        self.pending_expectation = None;
        Ok(&*self.plan.insert(plan))
    }

    pub fn plan(&self) -> Option<&SequencePlan> {
        self.plan.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.plan.as_ref().is_some_and(|p| p.is_enabled)
    }

    pub fn current_segment(&self) -> Option<&PlanSegment> {
        let plan = self.plan.as_ref()?;
        plan.segments.get(self.current_segment)
    }

    /// Called on every transport tick with the position inside the active
    /// physical file. Returns a switch request when playback has crossed
    /// (and dwelled past) a boundary into a segment on the other file.
    pub fn update_for_time(&mut self, file_time: f64, is_playing: bool) -> Option<TrackSwitch> {
        let enabled = self.is_enabled();
        if !enabled {
            return None;
        }
        if self.open_transition.is_some() {
            tracing::debug!(file_time, "tick suppressed during track transition");
            return None;
        }
        if let Some(expected) = self.pending_expectation {
            if (file_time - expected).abs() > SETTLE_WINDOW {
                tracing::debug!(
                    file_time,
                    expected,
                    "tick outside settle window of completed transition; ignored"
                );
                return None;
            }
            self.pending_expectation = None;
        }
        if !is_playing {
            return None;
        }

        let plan = self.plan.as_ref()?;
        let segment = plan.segments.get(self.current_segment)?;
        let file_end = segment.file_offset + segment.duration;
        // Hold the dwell at segment end before advancing so the last word's
        // highlight can linger.
        if file_time < file_end + self.config.dwell_tolerance {
            return None;
        }
        self.advance_segment()
    }

    /// Transport end-of-file: advance past the current segment regardless
    /// of the dwell (there is no more audio to hold on).
    pub fn handle_playback_ended(&mut self) -> Option<TrackSwitch> {
        if !self.is_enabled() || self.open_transition.is_some() {
            return None;
        }
        self.advance_segment()
    }

    fn advance_segment(&mut self) -> Option<TrackSwitch> {
        let plan = self.plan.as_ref()?;
        let next = self.current_segment + 1;
        let next_segment = plan.segments.get(next)?;
        let previous_track = plan.segments[self.current_segment].track;
        self.current_segment = next;
        if next_segment.track == previous_track {
            // Same file, contiguous audio; no switch needed.
            return None;
        }
        Some(TrackSwitch {
            track: next_segment.track,
            url: plan.url_for(next_segment.track).to_string(),
            seek_time: next_segment.file_offset,
        })
    }

    /// Resume/jump support: position the controller at a sentence and
    /// return where the transport should go.
    pub fn seek_to_sentence(
        &mut self,
        sentence_index: usize,
        preferred_track: Option<PhysicalTrack>,
    ) -> Option<SeekTarget> {
        let plan = self.plan.as_ref()?;
        let position = plan
            .segments
            .iter()
            .position(|s| {
                s.sentence_index == sentence_index
                    && preferred_track.is_none_or(|track| s.track == track)
            })
            .or_else(|| {
                plan.segments
                    .iter()
                    .position(|s| s.sentence_index == sentence_index)
            })?;
        self.current_segment = position;
        let segment = &plan.segments[position];
        Some(SeekTarget {
            track: segment.track,
            url: plan.url_for(segment.track).to_string(),
            time: segment.file_offset,
        })
    }

    /// Maps a position inside the active physical file onto the combined
    /// logical timeline, for feeding the display resolver.
    pub fn logical_time(&self, file_time: f64) -> Option<f64> {
        let plan = self.plan.as_ref()?;
        let segment = plan.segments.get(self.current_segment)?;
        let within = (file_time - segment.file_offset).clamp(0.0, segment.duration);
        Some((segment.logical_start + within).clamp(0.0, plan.total_logical_duration))
    }

    /// Opens a transition bracket, superseding any open one. While a
    /// bracket is open, `update_for_time` suppresses all ticks.
    pub fn begin_transition(&mut self) -> TransitionToken {
        if self.open_transition.is_some() {
            tracing::warn!("superseding an unfinished track transition");
        }
        self.generation += 1;
        self.open_transition = Some(self.generation);
        self.pending_expectation = None;
        TransitionToken(self.generation)
    }

    /// Closes a transition once the seek has taken effect. Returns false
    /// when the token was superseded by a newer `begin_transition`; a
    /// superseded completion must not unblock ticks.
    pub fn end_transition(&mut self, token: TransitionToken, expected_time: f64) -> bool {
        if self.open_transition != Some(token.0) {
            tracing::debug!(token = token.0, "stale transition completion ignored");
            return false;
        }
        self.open_transition = None;
        self.pending_expectation = Some(expected_time);
        true
    }

    /// Convenience tick: reads the transport, applies any pending switch
    /// through it, and reports whether a switch happened.
    pub fn drive(&mut self, transport: &mut dyn Transport) -> bool {
        let switch = self.update_for_time(transport.current_time(), transport.is_playing());
        let Some(switch) = switch else {
            return false;
        };
        let token = self.begin_transition();
        transport.load(&switch.url, true);
        transport.seek(switch.seek_time);
        self.end_transition(token, switch.seek_time);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::types::PhaseDurations;

    fn dual_sentence(index: usize, original: f64, gap: f64, translation: f64) -> Sentence {
        Sentence {
            index,
            original_tokens: vec!["a".into()],
            translation_tokens: vec!["x".into()],
            phase_durations: Some(PhaseDurations {
                original,
                gap,
                translation,
                tail: 0.0,
            }),
            ..Sentence::default()
        }
    }

    fn controller_with_plan() -> SequenceController {
        let mut controller = SequenceController::new(TimelineConfig::default());
        let sentences = vec![
            dual_sentence(0, 1.0, 0.0, 2.0),
            dual_sentence(1, 1.0, 0.0, 2.0),
        ];
        controller
            .build_plan(&sentences, "orig.mp3", "trans.mp3", None, None)
            .expect("plan");
        controller
    }

    #[test]
    fn no_switch_before_segment_end_plus_dwell() {
        let mut controller = controller_with_plan();
        assert_eq!(controller.update_for_time(0.5, true), None);
        assert_eq!(controller.update_for_time(1.0, true), None, "dwell held");
        assert_eq!(controller.update_for_time(1.1, true), None, "still dwelling");
    }

    #[test]
    fn switch_fires_after_dwell_with_other_file_target() {
        let mut controller = controller_with_plan();
        let switch = controller
            .update_for_time(1.2, true)
            .expect("switch to translation");
        assert_eq!(switch.track, PhysicalTrack::Translation);
        assert_eq!(switch.url, "trans.mp3");
        assert!((switch.seek_time - 0.0).abs() < 1e-9);
    }

    #[test]
    fn paused_transport_never_advances() {
        let mut controller = controller_with_plan();
        assert_eq!(controller.update_for_time(5.0, false), None);
    }

    #[test]
    fn ticks_suppressed_while_transition_open() {
        let mut controller = controller_with_plan();
        let token = controller.begin_transition();
        assert_eq!(controller.update_for_time(1.5, true), None);
        assert!(controller.end_transition(token, 0.0));
        // First tick after completion must be near the expected seek time.
        assert_eq!(controller.update_for_time(0.9, true), None, "old-file tick");
        assert_eq!(controller.update_for_time(0.1, true), None);
    }

    #[test]
    fn superseded_transition_cannot_complete() {
        let mut controller = controller_with_plan();
        let stale = controller.begin_transition();
        let fresh = controller.begin_transition();
        assert!(!controller.end_transition(stale, 0.0));
        assert_eq!(
            controller.update_for_time(1.5, true),
            None,
            "still transitioning"
        );
        assert!(controller.end_transition(fresh, 0.0));
    }

    #[test]
    fn seek_to_sentence_prefers_requested_track() {
        let mut controller = controller_with_plan();
        let target = controller
            .seek_to_sentence(1, Some(PhysicalTrack::Translation))
            .expect("target");
        assert_eq!(target.track, PhysicalTrack::Translation);
        assert!((target.time - 2.0).abs() < 1e-9);

        let target = controller.seek_to_sentence(0, None).expect("target");
        assert_eq!(target.track, PhysicalTrack::Original);
        assert!((target.time - 0.0).abs() < 1e-9);
    }

    #[test]
    fn logical_time_maps_file_position_onto_combined_timeline() {
        let mut controller = controller_with_plan();
        // Segment 0: original sentence 0, logical [0, 1).
        assert!((controller.logical_time(0.5).unwrap() - 0.5).abs() < 1e-9);

        controller.seek_to_sentence(1, Some(PhysicalTrack::Translation));
        // Segment 3: translation sentence 1, file offset 2.0, logical 4.0.
        assert!((controller.logical_time(2.5).unwrap() - 4.5).abs() < 1e-9);
        // Positions before the segment clamp to its logical start.
        assert!((controller.logical_time(1.0).unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn drive_applies_switch_through_transport() {
        let mut controller = controller_with_plan();
        let mut transport = MockTransport {
            time: 1.2,
            playing: true,
            url: Some("orig.mp3".to_string()),
            ..MockTransport::default()
        };
        assert!(controller.drive(&mut transport));
        assert_eq!(transport.loads, vec![("trans.mp3".to_string(), true)]);
        assert_eq!(transport.seeks, vec![0.0]);

        // The settle expectation accepts the post-seek tick and playback
        // proceeds in the translation file.
        assert_eq!(controller.update_for_time(0.1, true), None);
        let switch = controller
            .update_for_time(2.2, true)
            .expect("switch back to original");
        assert_eq!(switch.track, PhysicalTrack::Original);
        assert!((switch.seek_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn playback_ended_advances_without_dwell() {
        let mut controller = controller_with_plan();
        let switch = controller.handle_playback_ended().expect("switch");
        assert_eq!(switch.track, PhysicalTrack::Translation);
    }
}
