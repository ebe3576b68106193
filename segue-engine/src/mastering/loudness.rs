//! Simplified LUFS measurement and normalization
//!
//! Loudness is approximated as `-0.691 + 10 * log10(mean_square)` over all
//! channels, without K-weighting or gating. Good enough to bring a mix to
//! a consistent level; not a broadcast meter.

/// Loudness assumed for silent or empty buffers, LUFS.
const SILENCE_LUFS: f32 = -60.0;

use crate::buffer::PcmBuffer;

/// Measure the simplified integrated loudness of a buffer.
pub fn measure_lufs(buf: &PcmBuffer) -> f32 {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for channel in &buf.channels {
        for &s in channel {
            if s.is_finite() {
                sum += (s as f64) * (s as f64);
            }
            count += 1;
        }
    }
    if count == 0 {
        return SILENCE_LUFS;
    }

    let mean_square = sum / count as f64;
    if mean_square <= 1e-10 {
        return SILENCE_LUFS;
    }
    -0.691 + 10.0 * mean_square.log10() as f32
}

/// Apply the linear gain that moves the buffer's measured loudness to
/// `target_lufs`. Silence stays silence: the gain is finite and zeros map
/// to zeros.
pub fn normalize_loudness(buf: &mut PcmBuffer, target_lufs: f32) -> f32 {
    let current = measure_lufs(buf);
    let gain = 10.0f32.powf((target_lufs - current) / 20.0);
    for channel in &mut buf.channels {
        for s in channel {
            *s *= gain;
        }
    }
    gain
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(amplitude: f32, frames: usize) -> PcmBuffer {
        let channel: Vec<f32> = (0..frames)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 48000.0).sin() * amplitude)
            .collect();
        PcmBuffer::new(48000, vec![channel.clone(), channel])
    }

    #[test]
    fn test_silence_measures_floor() {
        assert_eq!(measure_lufs(&PcmBuffer::silent(48000, 2, 48000)), -60.0);
        assert_eq!(measure_lufs(&PcmBuffer::new(48000, Vec::new())), -60.0);
    }

    #[test]
    fn test_full_scale_sine_measurement() {
        // A full-scale sine has mean square 0.5 -> -0.691 - 3.01 = -3.7
        let lufs = measure_lufs(&sine(1.0, 48000));
        assert!((lufs - (-3.7)).abs() < 0.2, "got {}", lufs);
    }

    #[test]
    fn test_normalize_hits_target() {
        let mut buf = sine(0.1, 48000);
        normalize_loudness(&mut buf, -14.0);
        let after = measure_lufs(&buf);
        assert!((after - (-14.0)).abs() < 0.1, "got {}", after);
    }

    #[test]
    fn test_normalize_attenuates_loud_input() {
        let mut buf = sine(1.0, 48000);
        let gain = normalize_loudness(&mut buf, -14.0);
        assert!(gain < 1.0, "loud input needs attenuation, gain {}", gain);
    }

    #[test]
    fn test_silence_stays_silent() {
        let mut buf = PcmBuffer::silent(48000, 2, 9600);
        normalize_loudness(&mut buf, -14.0);
        assert!(buf.channels.iter().flatten().all(|&s| s == 0.0));
    }
}
