//! Per-track analysis summary and the analyzer that assembles it

use serde::Serialize;

use crate::beatgrid::{downbeats, fallback_grid, phrases, tempo_from_beats, BeatAnalyzer};
use crate::camelot::CamelotKey;
use crate::energy::{energy_curve, VocalDetector};
use crate::key::KeyAnalyzer;

/// A phrase: a run of four bars anchored at a downbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhraseSpan {
    /// Index into `downbeat_indices` marking the phrase start
    pub downbeat_index: usize,
    /// Phrase length in beats, quantized to 16
    pub length_beats: u32,
}

/// Everything the planner needs to know about one track.
///
/// All numeric fields are finite and all confidences lie in [0, 1]; on
/// degenerate input the analyzer substitutes [`AnalysisSummary::fallback`]
/// instead of failing, so consumers never see an error.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    /// Estimated tempo in [60, 200] BPM
    pub bpm: f32,
    /// Half/double octave candidate
    pub bpm_alt: f32,
    pub bpm_confidence: f32,
    pub camelot: CamelotKey,
    /// Dominant pitch class, semitones above A
    pub key_semitone: u8,
    pub key_confidence: f32,
    /// Non-decreasing beat times in seconds
    pub beat_times: Vec<f32>,
    /// Indices into `beat_times` marking bar starts
    pub downbeat_indices: Vec<usize>,
    pub phrase_spans: Vec<PhraseSpan>,
    /// 20 ms RMS envelope, smoothed
    pub energy_curve: Vec<f32>,
    /// Per-4096-sample-hop vocal probability
    pub vocal_likelihood: Vec<f32>,
    /// Beat times refined to local low-band maxima
    pub kick_times: Vec<f32>,
}

impl AnalysisSummary {
    /// Summary substituted for degenerate input: neutral tempo, 1A key,
    /// the synthetic beat grid, and a flat half-scale energy curve.
    pub fn fallback() -> Self {
        let beat_times = fallback_grid();
        Self {
            bpm: 120.0,
            bpm_alt: 60.0,
            bpm_confidence: 0.0,
            camelot: CamelotKey { number: 1, is_major: false },
            key_semitone: 0,
            key_confidence: 0.0,
            downbeat_indices: vec![0],
            phrase_spans: Vec::new(),
            beat_times,
            energy_curve: vec![0.5],
            vocal_likelihood: Vec::new(),
            kick_times: Vec::new(),
        }
    }

    /// Mean vocal likelihood; zero when no frames were analyzed.
    pub fn average_vocal(&self) -> f32 {
        if self.vocal_likelihood.is_empty() {
            return 0.0;
        }
        self.vocal_likelihood.iter().sum::<f32>() / self.vocal_likelihood.len() as f32
    }

    /// Number of bars observed, at least one.
    pub fn bar_count(&self) -> usize {
        self.downbeat_indices.len().max(1)
    }

    /// Energy at the head of the track.
    pub fn opening_energy(&self) -> f32 {
        self.energy_curve.first().copied().unwrap_or(0.5)
    }

    /// Energy at the tail of the track.
    pub fn closing_energy(&self) -> f32 {
        self.energy_curve.last().copied().unwrap_or(0.5)
    }
}

/// Full track analyzer for one sample rate.
///
/// Owns one FFT plan per frame size; reuse the analyzer across tracks of
/// the same rate to avoid replanning.
pub struct TrackAnalyzer {
    sample_rate: u32,
    beats: BeatAnalyzer,
    key: KeyAnalyzer,
    vocal: VocalDetector,
}

impl TrackAnalyzer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            beats: BeatAnalyzer::new(sample_rate),
            key: KeyAnalyzer::new(sample_rate),
            vocal: VocalDetector::new(sample_rate),
        }
    }

    /// Analyze planar channels into a summary. Total over any input.
    pub fn analyze(&mut self, channels: &[Vec<f32>]) -> AnalysisSummary {
        if self.sample_rate == 0 {
            return AnalysisSummary::fallback();
        }
        let mono = downmix(channels);
        if mono.is_empty() {
            return AnalysisSummary::fallback();
        }

        let beat_times = self.beats.beat_times(&mono);
        let tempo = tempo_from_beats(&beat_times);
        let downbeat_indices = downbeats(&beat_times, tempo.bpm);
        let phrase_spans = phrases(&downbeat_indices);
        let key = self.key.analyze(&mono);
        let kick_times = self.beats.kick_times(&mono, &beat_times);

        AnalysisSummary {
            bpm: tempo.bpm,
            bpm_alt: tempo.bpm_alt,
            bpm_confidence: tempo.confidence,
            camelot: key.camelot,
            key_semitone: key.semitone,
            key_confidence: key.confidence,
            beat_times,
            downbeat_indices,
            phrase_spans,
            energy_curve: energy_curve(&mono, self.sample_rate),
            vocal_likelihood: self.vocal.likelihood(&mono),
            kick_times,
        }
    }
}

/// Mean-downmix planar channels to mono. Channels of unequal length are
/// truncated to the shortest; missing channels read as silence.
fn downmix(channels: &[Vec<f32>]) -> Vec<f32> {
    let Some(frames) = channels.iter().map(|c| c.len()).min() else {
        return Vec::new();
    };
    if channels.len() == 1 {
        return channels[0][..frames].to_vec();
    }
    let scale = 1.0 / channels.len() as f32;
    (0..frames)
        .map(|i| channels.iter().map(|c| c[i]).sum::<f32>() * scale)
        .collect()
}
