//! Noise sweep: a linearly rising noise bed into the transition

use rand::{rngs::StdRng, Rng};

use crate::buffer::PcmBuffer;
use crate::fx::span_valid;

/// Noise amplitude at full progress.
const NOISE_AMPLITUDE: f32 = 0.3;

/// Add uniform noise over `[start, start + duration)`, scaled linearly from
/// silence to [`NOISE_AMPLITUDE`].
///
/// The noise is drawn from the caller's seeded generator, one value per
/// frame shared across channels, so a fixed seed reproduces the render
/// bit for bit.
pub fn noise_sweep(
    buf: &mut PcmBuffer,
    start_secs: f32,
    duration_secs: f32,
    rng: &mut StdRng,
) -> bool {
    if !span_valid(start_secs, duration_secs) {
        tracing::warn!(start_secs, duration_secs, "noise sweep rejected: invalid span");
        return false;
    }

    let sr = buf.sample_rate as f32;
    let start = (start_secs * sr) as usize;
    let len = (duration_secs * sr) as usize;
    let frames = buf.frames();
    if start >= frames || len == 0 {
        tracing::debug!(start, frames, "noise sweep outside buffer, skipped");
        return false;
    }

    let end = (start + len).min(frames);
    for i in start..end {
        let progress = (i - start) as f32 / len as f32;
        let noise = rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE) * progress;
        for channel in &mut buf.channels {
            channel[i] += noise;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_sweep_adds_rising_noise() {
        let mut buf = PcmBuffer::silent(44100, 2, 44100);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(noise_sweep(&mut buf, 0.0, 1.0, &mut rng));

        // Early samples are near-silent, late samples carry noise
        let head: f32 = buf.channels[0][..4410].iter().map(|s| s.abs()).sum();
        let tail: f32 = buf.channels[0][39690..].iter().map(|s| s.abs()).sum();
        assert!(tail > head * 2.0, "head {} tail {}", head, tail);
        assert!(buf.peak() <= NOISE_AMPLITUDE + 1e-6);
    }

    #[test]
    fn test_sweep_deterministic_per_seed() {
        let mut one = PcmBuffer::silent(44100, 1, 22050);
        let mut two = PcmBuffer::silent(44100, 1, 22050);
        let mut rng_one = StdRng::seed_from_u64(42);
        let mut rng_two = StdRng::seed_from_u64(42);

        noise_sweep(&mut one, 0.1, 0.3, &mut rng_one);
        noise_sweep(&mut two, 0.1, 0.3, &mut rng_two);
        assert_eq!(one.channels, two.channels);

        let mut other = PcmBuffer::silent(44100, 1, 22050);
        let mut rng_other = StdRng::seed_from_u64(43);
        noise_sweep(&mut other, 0.1, 0.3, &mut rng_other);
        assert_ne!(one.channels, other.channels);
    }

    #[test]
    fn test_sweep_shared_across_channels() {
        let mut buf = PcmBuffer::silent(48000, 2, 48000);
        let mut rng = StdRng::seed_from_u64(1);
        noise_sweep(&mut buf, 0.0, 0.5, &mut rng);
        assert_eq!(buf.channels[0], buf.channels[1]);
    }

    #[test]
    fn test_sweep_rejects_bad_params() {
        let mut buf = PcmBuffer::silent(44100, 1, 4410);
        let original = buf.clone();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(!noise_sweep(&mut buf, f32::NAN, 1.0, &mut rng));
        assert!(!noise_sweep(&mut buf, 0.0, -1.0, &mut rng));
        assert!(!noise_sweep(&mut buf, 0.0, f32::INFINITY, &mut rng));
        assert!(!noise_sweep(&mut buf, 100.0, 1.0, &mut rng));
        assert_eq!(buf, original);
    }
}
