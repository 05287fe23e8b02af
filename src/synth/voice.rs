//! Voice trait for one-shot note subgraphs

/// A single fired note, rendered sample by sample on the audio thread.
///
/// Voices are told the absolute audio-clock time of every sample they render,
/// so a voice scheduled ahead of the clock stays silent until its start time.
pub trait Voice: Send {
    /// Render the sample at `now` seconds
    fn render(&mut self, now: f64) -> f64;

    /// True once the voice will never produce sound again
    fn is_finished(&self, now: f64) -> bool;

    /// Number of graph nodes this voice holds while alive
    fn node_count(&self) -> usize;
}
