//! Bass mono-ization via a moving-average band split

use crate::buffer::PcmBuffer;

/// Collapse content below `cutoff_hz` to mono.
///
/// For each sample the low band is a centered window mean over
/// `±sample_rate / (2 * cutoff)` samples; every channel emits the mono
/// average of the lows plus its own residual highs. Mono and empty
/// buffers pass through untouched.
pub fn bass_mono(buf: &mut PcmBuffer, cutoff_hz: f32) {
    let frames = buf.frames();
    if buf.channel_count() < 2 || frames == 0 {
        return;
    }
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 {
        tracing::warn!(cutoff_hz, "bass mono rejected: invalid cutoff");
        return;
    }

    let radius = (buf.sample_rate as f32 / (2.0 * cutoff_hz)) as usize;
    let channel_count = buf.channels.len();

    // Prefix sums over the pre-effect signal give each window mean in O(1)
    let prefix: Vec<Vec<f64>> = buf
        .channels
        .iter()
        .map(|channel| {
            let mut acc = Vec::with_capacity(channel.len() + 1);
            acc.push(0.0f64);
            let mut sum = 0.0f64;
            for &s in channel {
                sum += s as f64;
                acc.push(sum);
            }
            acc
        })
        .collect();

    let mut lows = vec![0.0f32; channel_count];
    for i in 0..frames {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius).min(frames - 1);
        let span = (hi - lo + 1) as f64;

        let mut mono_low = 0.0f32;
        for (c, pre) in prefix.iter().enumerate() {
            let avg = ((pre[hi + 1] - pre[lo]) / span) as f32;
            lows[c] = avg;
            mono_low += avg;
        }
        mono_low /= channel_count as f32;

        for (c, channel) in buf.channels.iter_mut().enumerate() {
            channel[i] = mono_low + (channel[i] - lows[c]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_mono_passthrough() {
        let mut buf = PcmBuffer::new(48000, vec![vec![0.4; 1024]]);
        let original = buf.clone();
        bass_mono(&mut buf, 120.0);
        assert_eq!(buf, original);
    }

    #[test]
    fn test_opposite_dc_collapses() {
        // Pure anti-phase DC is all "low" content: both channels must meet
        // at the mono mean (zero)
        let mut buf = PcmBuffer::new(48000, vec![vec![0.5; 4800], vec![-0.5; 4800]]);
        bass_mono(&mut buf, 120.0);
        for i in 500..4300 {
            assert!(buf.channels[0][i].abs() < 1e-3, "L at {} = {}", i, buf.channels[0][i]);
            assert!(buf.channels[1][i].abs() < 1e-3, "R at {} = {}", i, buf.channels[1][i]);
        }
    }

    #[test]
    fn test_high_band_keeps_width() {
        // 5 kHz anti-phase: far above the cutoff, the window average is
        // near zero, so the side content survives
        let sr = 48000;
        let left: Vec<f32> = (0..sr)
            .map(|i| (2.0 * PI * 5000.0 * i as f32 / sr as f32).sin() * 0.5)
            .collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let mut buf = PcmBuffer::new(sr as u32, vec![left.clone(), right]);
        bass_mono(&mut buf, 120.0);

        let width: f32 = (1000..47000)
            .map(|i| (buf.channels[0][i] - buf.channels[1][i]).abs())
            .sum::<f32>()
            / 46000.0;
        assert!(width > 0.4, "high-band width collapsed to {}", width);
    }

    #[test]
    fn test_invalid_cutoff_noop() {
        let mut buf = PcmBuffer::new(48000, vec![vec![0.1; 64], vec![0.2; 64]]);
        let original = buf.clone();
        bass_mono(&mut buf, 0.0);
        bass_mono(&mut buf, f32::NAN);
        assert_eq!(buf, original);
    }
}
