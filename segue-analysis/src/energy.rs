//! Energy envelope and vocal-likelihood features

use crate::spectral::SpectrumAnalyzer;

/// Vocal-likelihood frame/hop length in samples.
const VOCAL_HOP: usize = 4096;
/// Presence band for vocals, Hz.
const VOCAL_BAND: (f32, f32) = (2000.0, 5000.0);
/// Smoothing radius for the energy curve, in 20 ms frames.
const SMOOTH_RADIUS: usize = 5;

/// 20 ms RMS envelope smoothed with a ±5-frame centered average.
///
/// Never emits non-finite values; empty input yields a single neutral 0.5
/// frame so the planner's energy comparisons stay defined.
pub fn energy_curve(mono: &[f32], sample_rate: u32) -> Vec<f32> {
    if mono.is_empty() || sample_rate == 0 {
        return vec![0.5];
    }

    let window = (sample_rate as usize / 50).max(1);
    let mut raw = Vec::with_capacity(mono.len() / window + 1);
    for chunk in mono.chunks(window) {
        let mean_square = chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32;
        let rms = mean_square.sqrt();
        raw.push(if rms.is_finite() { rms } else { 0.0 });
    }

    let mut smoothed = Vec::with_capacity(raw.len());
    for i in 0..raw.len() {
        let lo = i.saturating_sub(SMOOTH_RADIUS);
        let hi = (i + SMOOTH_RADIUS).min(raw.len() - 1);
        let mean = raw[lo..=hi].iter().sum::<f32>() / (hi - lo + 1) as f32;
        smoothed.push(mean);
    }
    smoothed
}

/// Per-hop vocal-presence estimator.
///
/// For each 4096-sample hop the likelihood is the doubled share of spectral
/// magnitude in the 2-5 kHz presence band, clamped to [0, 1]. Silent frames
/// read as zero.
pub struct VocalDetector {
    spectrum: SpectrumAnalyzer,
    /// DFT bins inside the presence band
    band: Vec<usize>,
}

impl VocalDetector {
    pub fn new(sample_rate: u32) -> Self {
        let spectrum = SpectrumAnalyzer::new(VOCAL_HOP);
        let n = spectrum.fft_size();
        let sr = sample_rate as f32;

        let band = (0..n)
            .filter(|&k| {
                let freq = k as f32 * sr / n as f32;
                (VOCAL_BAND.0..=VOCAL_BAND.1).contains(&freq)
            })
            .collect();

        Self { spectrum, band }
    }

    pub fn likelihood(&mut self, mono: &[f32]) -> Vec<f32> {
        let n = self.spectrum.fft_size();
        let mut out = Vec::new();

        let mut pos = 0;
        while pos + n <= mono.len() {
            let mag = self.spectrum.magnitude_spectrum(&mono[pos..pos + n]);
            let total: f32 = mag.iter().sum();
            let band: f32 = self.band.iter().map(|&k| mag[k]).sum();

            let ratio = if total > f32::EPSILON {
                (2.0 * band / total).clamp(0.0, 1.0)
            } else {
                0.0
            };
            out.push(ratio);
            pos += VOCAL_HOP;
        }

        out
    }
}
