//! Spectral primitives shared by the analyzers
//!
//! A thin wrapper around rustfft that hands out magnitude spectra for a
//! fixed frame size, plus the strict local-peak test used by onset picking.

use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Magnitude-spectrum provider for a fixed power-of-two frame size.
///
/// Owns the planned FFT, a precomputed Hann window and a reusable scratch
/// buffer, so per-frame analysis allocates only the output vector.
pub struct SpectrumAnalyzer {
    fft_size: usize,
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
}

impl SpectrumAnalyzer {
    /// Create an analyzer for `fft_size` samples per frame (power of two, <= 4096).
    pub fn new(fft_size: usize) -> Self {
        debug_assert!(fft_size.is_power_of_two() && fft_size <= 4096);

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Hann window, applied to every frame so spectra stay comparable
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / fft_size as f32).cos()))
            .collect();

        Self {
            fft_size,
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Compute the magnitude spectrum of one frame.
    ///
    /// Returns all `fft_size` bins; for real input the upper half mirrors
    /// the lower. Short frames are zero-padded, non-finite samples read as
    /// silence.
    pub fn magnitude_spectrum(&mut self, frame: &[f32]) -> Vec<f32> {
        for i in 0..self.fft_size {
            let s = frame.get(i).copied().filter(|s| s.is_finite()).unwrap_or(0.0);
            self.buffer[i] = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);
        self.buffer.iter().map(|c| c.norm()).collect()
    }
}

/// True iff `series[i]` is strictly greater than every other element of
/// `[i - radius, i + radius]` (clamped to the series bounds).
pub fn is_local_peak(series: &[f32], i: usize, radius: usize) -> bool {
    if i >= series.len() {
        return false;
    }
    let lo = i.saturating_sub(radius);
    let hi = (i + radius).min(series.len() - 1);
    (lo..=hi).all(|j| j == i || series[j] < series[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_size() {
        let mut analyzer = SpectrumAnalyzer::new(1024);
        let frame = vec![0.0f32; 1024];
        assert_eq!(analyzer.magnitude_spectrum(&frame).len(), 1024);
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        let mut analyzer = SpectrumAnalyzer::new(1024);
        // Bin 32 of a 1024-point FFT: exactly 32 cycles per frame
        let frame: Vec<f32> = (0..1024)
            .map(|i| (2.0 * PI * 32.0 * i as f32 / 1024.0).sin())
            .collect();
        let mag = analyzer.magnitude_spectrum(&frame);

        let peak_bin = mag[..512]
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak_bin, 32);
    }

    #[test]
    fn test_short_frame_zero_padded() {
        let mut analyzer = SpectrumAnalyzer::new(512);
        let mag = analyzer.magnitude_spectrum(&[0.5f32; 100]);
        assert_eq!(mag.len(), 512);
        assert!(mag.iter().all(|m| m.is_finite()));
    }

    #[test]
    fn test_spectrum_mirror_symmetry() {
        let mut analyzer = SpectrumAnalyzer::new(256);
        let frame: Vec<f32> = (0..256).map(|i| ((i * 7) % 13) as f32 * 0.05).collect();
        let mag = analyzer.magnitude_spectrum(&frame);
        for k in 1..128 {
            assert!(
                (mag[k] - mag[256 - k]).abs() < 1e-3,
                "bin {} and its mirror differ: {} vs {}",
                k,
                mag[k],
                mag[256 - k]
            );
        }
    }

    #[test]
    fn test_local_peak_strict() {
        let series = [0.0, 1.0, 2.0, 1.0, 0.0];
        assert!(is_local_peak(&series, 2, 2));
        assert!(!is_local_peak(&series, 1, 2));

        // Plateau is not a strict peak
        let flat = [1.0, 2.0, 2.0, 1.0];
        assert!(!is_local_peak(&flat, 1, 1));
        assert!(!is_local_peak(&flat, 2, 1));
    }

    #[test]
    fn test_local_peak_at_edges() {
        let series = [3.0, 1.0, 0.5];
        assert!(is_local_peak(&series, 0, 2));
        assert!(!is_local_peak(&series, 5, 1));
    }
}
