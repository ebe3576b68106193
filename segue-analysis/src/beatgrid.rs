//! Beat grid analysis: spectral-flux onsets, tempo, downbeats and kicks
//!
//! Onset detection computes a spectral-flux curve at hop 512 over
//! 2048-sample frames and peak-picks it against an adaptive one-second
//! mean. Tempo comes from a histogram of inter-beat intervals. Downbeats
//! walk the picked beats against a 4/4 bar lattice. Everything degrades to
//! a small synthetic grid instead of failing.

use crate::spectral::{is_local_peak, SpectrumAnalyzer};
use crate::summary::PhraseSpan;

/// Analysis hop in samples.
const HOP: usize = 512;
/// Onset frame length in samples.
const FRAME: usize = 2048;
/// A flux value must exceed this multiple of the local mean to count.
const FLUX_THRESHOLD: f32 = 1.5;
/// Local-peak radius for onset picking, in flux frames.
const PEAK_RADIUS: usize = 3;
/// Kick search half-window around each beat, seconds.
const KICK_WINDOW_SECS: f32 = 0.05;
/// Sub-frame length for kick refinement.
const KICK_FRAME: usize = 512;
/// Slide step between candidate sub-frame starts inside the kick window.
const KICK_STEP: usize = KICK_FRAME / 8;
/// Low-band width for kick energy, in DFT bins of a `KICK_FRAME` spectrum.
const KICK_LOW_BINS: usize = 20;

/// Tempo estimate derived from inter-beat intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    /// Dominant tempo, clamped to [60, 200] BPM
    pub bpm: f32,
    /// Half/double octave candidate
    pub bpm_alt: f32,
    /// Share of intervals that voted for the dominant bin, 0-1
    pub confidence: f32,
}

/// The synthetic grid returned when onset detection has nothing to work with.
pub fn fallback_grid() -> Vec<f32> {
    vec![0.0, 0.5, 1.0, 1.5]
}

/// Onset-based beat and kick detection for one sample rate.
pub struct BeatAnalyzer {
    sample_rate: u32,
    spectrum: SpectrumAnalyzer,
    kick_spectrum: SpectrumAnalyzer,
}

impl BeatAnalyzer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            spectrum: SpectrumAnalyzer::new(FRAME),
            kick_spectrum: SpectrumAnalyzer::new(KICK_FRAME),
        }
    }

    /// Detect beat times in seconds, non-decreasing.
    ///
    /// Falls back to the synthetic grid when the input is shorter than one
    /// frame or no flux peak survives thresholding.
    pub fn beat_times(&mut self, mono: &[f32]) -> Vec<f32> {
        if mono.len() < FRAME {
            return fallback_grid();
        }

        let flux = self.onset_strength(mono);
        let mean_radius = (self.sample_rate as usize / HOP).max(1); // ~1 s of flux frames

        let mut times = Vec::new();
        for i in 0..flux.len() {
            let lo = i.saturating_sub(mean_radius);
            let hi = (i + mean_radius).min(flux.len() - 1);
            let mean = flux[lo..=hi].iter().sum::<f32>() / (hi - lo + 1) as f32;

            if flux[i] > FLUX_THRESHOLD * mean && is_local_peak(&flux, i, PEAK_RADIUS) {
                times.push(i as f32 * HOP as f32 / self.sample_rate as f32);
            }
        }

        if times.is_empty() {
            fallback_grid()
        } else {
            times
        }
    }

    /// Spectral flux: per-bin positive magnitude change between successive
    /// frames, squared, summed and square-rooted. Index t corresponds to the
    /// frame starting at t * HOP; the first frame has no predecessor and
    /// contributes zero.
    fn onset_strength(&mut self, mono: &[f32]) -> Vec<f32> {
        let mut flux = Vec::new();
        let mut prev: Option<Vec<f32>> = None;

        let mut start = 0;
        while start + FRAME <= mono.len() {
            let mag = self.spectrum.magnitude_spectrum(&mono[start..start + FRAME]);

            match &prev {
                Some(prev_mag) => {
                    let sum: f32 = mag
                        .iter()
                        .zip(prev_mag)
                        .map(|(c, p)| {
                            let d = (c - p).max(0.0);
                            d * d
                        })
                        .sum();
                    flux.push(sum.sqrt());
                }
                None => flux.push(0.0),
            }

            prev = Some(mag);
            start += HOP;
        }

        flux
    }

    /// Refine each beat to the start of the 512-sample sub-frame with the
    /// strongest low-band energy within ±50 ms.
    ///
    /// Candidate starts slide across the window in [`KICK_STEP`] increments
    /// so a transient straddling a block boundary still gets a sub-frame
    /// centered on it. Beats whose window cannot fit a full sub-frame are
    /// dropped, so the result is a subset.
    pub fn kick_times(&mut self, mono: &[f32], beat_times: &[f32]) -> Vec<f32> {
        let sr = self.sample_rate as f32;
        let half = (KICK_WINDOW_SECS * sr) as i64;

        let mut kicks = Vec::new();
        for &beat in beat_times {
            let center = (beat * sr) as i64;
            let lo = (center - half).max(0) as usize;
            let hi = (((center + half) as usize).max(lo)).min(mono.len());
            if hi < lo + KICK_FRAME {
                continue;
            }

            let mut best_start = lo;
            let mut best_energy = f32::MIN;
            let mut start = lo;
            while start + KICK_FRAME <= hi {
                let mag = self.kick_spectrum.magnitude_spectrum(&mono[start..start + KICK_FRAME]);
                let low: f32 = mag[..KICK_LOW_BINS].iter().sum();
                if low > best_energy {
                    best_energy = low;
                    best_start = start;
                }
                start += KICK_STEP;
            }

            kicks.push(best_start as f32 / sr);
        }
        kicks
    }
}

/// Estimate tempo from inter-beat intervals.
///
/// Each finite positive interval votes for `round(60 / interval)` BPM in a
/// [1, 299] histogram; the dominant bin clamped to [60, 200] wins.
pub fn tempo_from_beats(beat_times: &[f32]) -> TempoEstimate {
    let mut histogram = [0u32; 300];
    let mut total = 0u32;

    for pair in beat_times.windows(2) {
        let interval = pair[1] - pair[0];
        if !interval.is_finite() || interval <= 0.0 {
            continue;
        }
        let bin = (60.0 / interval).round().clamp(1.0, 299.0) as usize;
        histogram[bin] += 1;
        total += 1;
    }

    if total == 0 {
        return TempoEstimate {
            bpm: 120.0,
            bpm_alt: 60.0,
            confidence: 0.0,
        };
    }

    let (best_bin, best_count) = histogram
        .iter()
        .enumerate()
        .max_by_key(|(_, &count)| count)
        .map(|(bin, &count)| (bin, count))
        .unwrap_or((120, 0));

    let bpm = (best_bin as f32).clamp(60.0, 200.0);
    let bpm_alt = if bpm > 100.0 { bpm / 2.0 } else { bpm * 2.0 };

    TempoEstimate {
        bpm,
        bpm_alt,
        confidence: (best_count as f32 / total as f32).clamp(0.0, 1.0),
    }
}

/// Mark downbeats assuming 4/4, starting from beat 0.
///
/// A beat within half a beat-length of the expected bar line becomes the
/// next downbeat; a beat that overshoots the window resynchronizes the
/// expectation by flooring it onto the bar lattice anchored at beat 0.
pub fn downbeats(beat_times: &[f32], bpm: f32) -> Vec<usize> {
    if beat_times.is_empty() || !bpm.is_finite() || bpm <= 0.0 {
        return Vec::new();
    }

    let beat_len = 60.0 / bpm;
    let bar_len = 4.0 * beat_len;
    let tolerance = 0.5 * beat_len;
    let origin = beat_times[0];

    let mut marks = vec![0];
    let mut expected = origin + bar_len;

    for (i, &t) in beat_times.iter().enumerate().skip(1) {
        if t > expected + tolerance {
            // Fell off the grid: floor this beat back onto the bar lattice
            // anchored at beat 0, then re-test it below
            let bars_past = ((t - origin) / bar_len).floor();
            expected = origin + bars_past * bar_len;
        }
        if (t - expected).abs() <= tolerance {
            marks.push(i);
            expected = t + bar_len;
        }
    }

    marks
}

/// Group downbeats into 16-beat phrases: every complete run of four bars
/// becomes one span anchored at the run's first downbeat.
pub fn phrases(downbeat_indices: &[usize]) -> Vec<PhraseSpan> {
    downbeat_indices
        .chunks_exact(4)
        .map(|run| PhraseSpan {
            downbeat_index: run[0],
            length_beats: 16,
        })
        .collect()
}
