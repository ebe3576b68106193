//! Tape stop: quadratic slowdown into silence
//!
//! The playhead decelerates over the window before `stop`, resampling the
//! original material at an ever-slower rate with a gentle amplitude fade,
//! and everything from `stop` onward is silenced.

use crate::buffer::PcmBuffer;

/// Slow the region `[stop - duration, stop)` to a halt.
///
/// The read position follows `delta * (1 - p^2)` for window progress
/// `p = delta / duration`, with linear interpolation between source
/// samples and an amplitude fade of `1 - 0.5 * p`. Samples at and after
/// `stop` are zeroed.
pub fn tape_stop(buf: &mut PcmBuffer, stop_secs: f32, duration_secs: f32) -> bool {
    if !stop_secs.is_finite() || stop_secs < 0.0 || !duration_secs.is_finite() || duration_secs <= 0.0
    {
        tracing::warn!(stop_secs, duration_secs, "tape stop rejected: invalid span");
        return false;
    }

    let sr = buf.sample_rate as f32;
    let frames = buf.frames();
    let stop = ((stop_secs * sr) as usize).min(frames);
    let len = (duration_secs * sr) as usize;
    let begin = stop.saturating_sub(len);
    let window = stop - begin;
    if window == 0 {
        tracing::debug!(stop, "tape stop window empty, skipped");
        return false;
    }

    for channel in &mut buf.channels {
        let snapshot: Vec<f32> = channel[begin..stop].to_vec();

        for i in 0..window {
            let p = i as f32 / window as f32;
            let slowdown = 1.0 - p * p;
            let read_pos = i as f32 * slowdown;

            let idx = read_pos as usize;
            let frac = read_pos - idx as f32;
            let s0 = snapshot.get(idx).copied().unwrap_or(0.0);
            let s1 = snapshot.get(idx + 1).copied().unwrap_or(s0);
            let sample = s0 + (s1 - s0) * frac;

            channel[begin + i] = sample * (1.0 - 0.5 * p);
        }

        for s in channel[stop..].iter_mut() {
            *s = 0.0;
        }
    }
    true
}
