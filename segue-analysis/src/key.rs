//! Key detection via chromagram accumulation
//!
//! A 12-bin chromagram is accumulated over 4096-sample hops: every DFT bin
//! between 80 Hz and 5 kHz contributes its magnitude to the pitch class of
//! its nearest equal-tempered note (A440 reference, so pitch class 0 is A).
//! The dominant class maps through the Camelot tables; mode is read off the
//! third above the tonic.

use crate::camelot::CamelotKey;
use crate::spectral::SpectrumAnalyzer;

/// Chromagram frame/hop length in samples.
const HOP: usize = 4096;
/// Lowest frequency contributing to the chromagram, Hz.
const MIN_FREQ: f32 = 80.0;
/// Highest frequency contributing to the chromagram, Hz.
const MAX_FREQ: f32 = 5000.0;

/// Detected key with its pitch class and confidence.
#[derive(Debug, Clone, Copy)]
pub struct DetectedKey {
    pub camelot: CamelotKey,
    /// Dominant pitch class, semitones above A, 0-11
    pub semitone: u8,
    /// Dominant bin share of total chroma energy, 0-1
    pub confidence: f32,
}

impl DetectedKey {
    /// The degenerate-input answer: 1A with zero confidence.
    pub fn fallback() -> Self {
        Self {
            camelot: CamelotKey { number: 1, is_major: false },
            semitone: 0,
            confidence: 0.0,
        }
    }
}

/// Chromagram-based key analyzer for one sample rate.
pub struct KeyAnalyzer {
    spectrum: SpectrumAnalyzer,
    /// Pitch class per DFT bin, None outside the 80 Hz - 5 kHz band
    bin_pitch_class: Vec<Option<u8>>,
}

impl KeyAnalyzer {
    pub fn new(sample_rate: u32) -> Self {
        let spectrum = SpectrumAnalyzer::new(HOP);
        let n = spectrum.fft_size();
        let sr = sample_rate as f32;

        // Precompute the bin -> pitch-class mapping once; the analysis loop
        // then only sums magnitudes
        let bin_pitch_class = (0..n)
            .map(|k| {
                let freq = k as f32 * sr / n as f32;
                if !(MIN_FREQ..=MAX_FREQ).contains(&freq) {
                    return None;
                }
                let semis = (12.0 * (freq / 440.0).log2()).round() as i32;
                Some((((semis % 12) + 12) % 12) as u8)
            })
            .collect();

        Self { spectrum, bin_pitch_class }
    }

    /// Detect the key of a mono signal. Total: silence and too-short input
    /// yield the 1A fallback.
    pub fn analyze(&mut self, mono: &[f32]) -> DetectedKey {
        let chroma = self.chromagram(mono);
        let sum: f32 = chroma.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return DetectedKey::fallback();
        }

        let dominant = chroma
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(pc, _)| pc)
            .unwrap_or(0);

        // Mode from the third above the tonic: a stronger minor third reads
        // as minor; ties fall minor as well
        let minor = chroma[(dominant + 3) % 12] >= chroma[(dominant + 4) % 12];

        DetectedKey {
            camelot: CamelotKey::from_pitch_class(dominant as u8, minor),
            semitone: dominant as u8,
            confidence: (chroma[dominant] / sum).clamp(0.0, 1.0),
        }
    }

    fn chromagram(&mut self, mono: &[f32]) -> [f32; 12] {
        let n = self.spectrum.fft_size();
        let mut chroma = [0.0f32; 12];

        let mut pos = 0;
        while pos + n <= mono.len() {
            let mag = self.spectrum.magnitude_spectrum(&mono[pos..pos + n]);
            for (k, &m) in mag.iter().enumerate() {
                if let Some(pc) = self.bin_pitch_class[k] {
                    chroma[pc as usize] += m;
                }
            }
            pos += HOP;
        }

        chroma
    }
}
