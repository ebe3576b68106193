//! Reverse reverb: a pre-echo swell built from the mirrored source

use crate::buffer::PcmBuffer;
use crate::fx::span_valid;

/// Wet gain of the mirrored tail.
const WET_GAIN: f32 = 0.4;

/// Add a reversed, decaying copy of `[start, start + duration)` onto itself:
/// sample `i` of the window receives the window's sample `duration - i`,
/// faded by `1 - i/duration` and scaled by [`WET_GAIN`].
///
/// The source region is snapshotted first, so the mirrored read is taken
/// from the pre-effect signal.
pub fn reverse_reverb(buf: &mut PcmBuffer, start_secs: f32, duration_secs: f32) -> bool {
    if !span_valid(start_secs, duration_secs) {
        tracing::warn!(start_secs, duration_secs, "reverse reverb rejected: invalid span");
        return false;
    }

    let sr = buf.sample_rate as f32;
    let start = (start_secs * sr) as usize;
    let len = (duration_secs * sr) as usize;
    let frames = buf.frames();
    if start >= frames || len == 0 {
        tracing::debug!(start, frames, "reverse reverb outside buffer, skipped");
        return false;
    }

    for channel in &mut buf.channels {
        let snapshot: Vec<f32> = channel[start..(start + len + 1).min(frames)].to_vec();
        for i in 0..len {
            let dst = start + i;
            if dst >= frames {
                break;
            }
            let src = snapshot.get(len - i).copied().unwrap_or(0.0);
            channel[dst] += src * (1.0 - i as f32 / len as f32) * WET_GAIN;
        }
    }
    true
}
