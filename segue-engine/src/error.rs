//! Renderer error types
//!
//! The analyzer and planner are total; only the renderer's input boundary
//! can fail. Everything past that point degrades instead of erroring.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("track {0} is empty")]
    EmptyTrack(&'static str),

    #[error("track {0} has a zero sample rate")]
    InvalidSampleRate(&'static str),

    #[error("tracks disagree on sample rate: {0} Hz vs {1} Hz")]
    SampleRateMismatch(u32, u32),

    /// A non-finite or non-positive tempo coming out of analysis indicates
    /// an analyzer bug, not bad user input; surfaced hard.
    #[error("analysis produced an unusable tempo for track {0}: {1}")]
    UnusableTempo(&'static str, f32),
}
