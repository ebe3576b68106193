//! Glue compressor: gentle bus compression over the finished mix

use crate::buffer::PcmBuffer;
use crate::mastering::db_to_linear;

/// One-pole envelope glue compressor.
///
/// The envelope follows the channel-linked peak with separate attack and
/// release time constants; above threshold the gain follows
/// `(env / threshold) ^ (1/ratio - 1)`.
#[derive(Debug, Clone, Copy)]
pub struct GlueCompressor {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
}

impl Default for GlueCompressor {
    fn default() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 2.0,
            attack_ms: 10.0,
            release_ms: 80.0,
        }
    }
}

impl GlueCompressor {
    /// Compress the buffer in place.
    pub fn process(&self, buf: &mut PcmBuffer) {
        let frames = buf.frames();
        if frames == 0 || buf.sample_rate == 0 || self.ratio <= 0.0 {
            return;
        }

        let sr = buf.sample_rate as f32;
        let attack = (-1.0 / (sr * self.attack_ms / 1000.0)).exp();
        let release = (-1.0 / (sr * self.release_ms / 1000.0)).exp();
        let threshold = db_to_linear(self.threshold_db);
        let exponent = 1.0 / self.ratio - 1.0;

        let mut envelope = 0.0f32;
        for i in 0..frames {
            let peak = buf
                .channels
                .iter()
                .map(|c| c[i].abs())
                .fold(0.0f32, f32::max);
            let peak = if peak.is_finite() { peak } else { 0.0 };

            let coeff = if peak > envelope { attack } else { release };
            envelope = coeff * envelope + (1.0 - coeff) * peak;

            let gain = if envelope > threshold {
                (envelope / threshold).powf(exponent)
            } else {
                1.0
            };

            for channel in &mut buf.channels {
                channel[i] *= gain;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signal_untouched() {
        // Well below the -12 dBFS threshold
        let mut buf = PcmBuffer::new(48000, vec![vec![0.05; 4800]]);
        GlueCompressor::default().process(&mut buf);
        assert!(buf.channels[0].iter().all(|&s| (s - 0.05).abs() < 1e-6));
    }

    #[test]
    fn test_loud_signal_reduced() {
        // 0.9 is ~ -0.9 dBFS, well above threshold once the envelope settles
        let mut buf = PcmBuffer::new(48000, vec![vec![0.9; 48000]]);
        GlueCompressor::default().process(&mut buf);

        let settled = buf.channels[0][40000];
        // 2:1 above -12 dBFS: expect several dB of reduction
        assert!(settled < 0.75, "expected gain reduction, got {}", settled);
        assert!(settled > 0.3, "over-compressed to {}", settled);
    }

    #[test]
    fn test_release_recovers() {
        // Loud burst then quiet: the quiet tail should return to unity gain
        let mut samples = vec![0.9f32; 9600];
        samples.extend(vec![0.05f32; 48000]);
        let mut buf = PcmBuffer::new(48000, vec![samples]);
        GlueCompressor::default().process(&mut buf);

        let tail = buf.channels[0][buf.frames() - 1];
        assert!((tail - 0.05).abs() < 1e-3, "tail {}", tail);
    }

    #[test]
    fn test_stereo_linked_gain() {
        // A loud left channel must also duck the right
        let left = vec![0.9f32; 48000];
        let right = vec![0.2f32; 48000];
        let mut buf = PcmBuffer::new(48000, vec![left, right]);
        GlueCompressor::default().process(&mut buf);

        let settled_r = buf.channels[1][40000];
        assert!(settled_r < 0.2, "right channel should be ducked, got {}", settled_r);
    }

    #[test]
    fn test_empty_buffer_noop() {
        let mut buf = PcmBuffer::new(48000, Vec::new());
        GlueCompressor::default().process(&mut buf);
        assert!(buf.is_empty());
    }
}
