//! EQ morph: an amplitude-only spectral handover across the overlap
//!
//! The outgoing track ducks from unity to 30% while the incoming track
//! rises from 30% to unity. Both ramps are linear in window progress, so
//! the blend is monotone - the property a real low-shelf implementation
//! would also have to keep.

use crate::buffer::PcmBuffer;
use crate::fx::span_valid;

/// Floor the outgoing track decays to / the incoming track starts from.
const MORPH_FLOOR: f32 = 0.3;

/// Morph `a` (from `a_start_secs`) into `b` (from its head) over
/// `duration_secs`: `a *= 1 - 0.7p`, `b *= 0.3 + 0.7p`.
pub fn eq_morph(a: &mut PcmBuffer, b: &mut PcmBuffer, a_start_secs: f32, duration_secs: f32) -> bool {
    if !span_valid(a_start_secs, duration_secs) {
        tracing::warn!(a_start_secs, duration_secs, "eq morph rejected: invalid span");
        return false;
    }

    ramp(a, (a_start_secs * a.sample_rate as f32) as usize, duration_secs, |p| {
        1.0 - (1.0 - MORPH_FLOOR) * p
    });
    ramp(b, 0, duration_secs, |p| MORPH_FLOOR + (1.0 - MORPH_FLOOR) * p);
    true
}

fn ramp(buf: &mut PcmBuffer, start: usize, duration_secs: f32, gain: impl Fn(f32) -> f32) {
    let len = (duration_secs * buf.sample_rate as f32) as usize;
    let frames = buf.frames();
    if start >= frames || len == 0 {
        return;
    }
    let end = (start + len).min(frames);
    for channel in &mut buf.channels {
        for i in start..end {
            let progress = (i - start) as f32 / len as f32;
            channel[i] *= gain(progress);
        }
    }
}
