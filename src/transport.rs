/// Seam to the external audio player. The engine never decodes or plays
/// audio; it only reads the transport clock and requests loads/seeks.
pub trait Transport: Send {
    /// Playback position within the currently loaded file, in seconds.
    fn current_time(&self) -> f64;
    /// Duration of the currently loaded file, in seconds; 0 when unknown.
    fn duration(&self) -> f64;
    fn is_playing(&self) -> bool;
    /// URL of the currently loaded file, if any.
    fn active_url(&self) -> Option<&str>;
    fn seek(&mut self, time: f64);
    fn load(&mut self, url: &str, auto_play: bool);
    fn set_playback_rate(&mut self, rate: f64);
}
