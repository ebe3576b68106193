//! Time-domain effects for the transition
//!
//! Every effect mutates an owned buffer in place and reports whether it
//! actually ran. Invalid parameters (non-finite times, non-positive
//! durations, a zero tempo) never fail the pipeline: the effect logs the
//! rejection and leaves the buffer untouched.

mod eq_morph;
mod reverse_reverb;
mod stutter;
mod sweep;
mod tape_stop;

pub use eq_morph::eq_morph;
pub use reverse_reverb::reverse_reverb;
pub use stutter::stutter;
pub use sweep::noise_sweep;
pub use tape_stop::tape_stop;

/// Shared validation for second-valued FX parameters.
fn span_valid(start_secs: f32, duration_secs: f32) -> bool {
    start_secs.is_finite() && start_secs >= 0.0 && duration_secs.is_finite() && duration_secs > 0.0
}
