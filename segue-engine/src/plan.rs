//! Transition planning
//!
//! A pure decision procedure over two analysis summaries and a mix mode.
//! The same inputs always produce the same plan, so planning can run
//! speculatively and plans can be compared byte for byte.

use segue_analysis::AnalysisSummary;
use serde::Serialize;

/// Tempo gap (relative to A) above which beatmatching is hopeless.
const TEMPO_GAP_HARD: f32 = 0.06;
/// Tempo gap below which the tracks are effectively beatmatched.
const TEMPO_GAP_CLOSE: f32 = 0.02;
/// Mean vocal likelihood above which a track counts as vocal.
const VOCAL_THRESHOLD: f32 = 0.3;
/// Energy step across the seam that counts as a mismatch.
const ENERGY_MISMATCH: f32 = 0.3;

/// Rendering intent selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MixMode {
    /// Big-room: dramatic effects, short transitions
    Festival,
    /// Long blends, patient EQ morphs
    ClubSmooth,
    #[default]
    Neutral,
}

/// The shape of the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionStyle {
    /// Abrupt swap on a downbeat, S-curve fade
    HardDownbeat,
    /// Long spectral morph between beatmatched tracks
    EqMorph,
    /// Swap the low end mid-blend
    BassSwap,
    /// Short linear fade that keeps vocals intelligible
    VocalAware,
    /// Stutter the incoming track into the drop
    StutterEntry,
}

/// Which input track an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackId {
    A,
    B,
}

/// Advisory tempo adjustment toward a common BPM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TempoOp {
    pub track: TrackId,
    /// Percent stretch relative to the track's native tempo
    pub stretch_percent: f32,
}

/// Advisory pitch correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PitchOp {
    pub track: TrackId,
    pub semitones: i8,
    /// Whether the renderer should preserve formants if it realizes this
    pub formant_preserve: bool,
}

/// Effect type with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FxKind {
    /// Rising noise bed into the transition
    Sweep { duration_secs: f32 },
    /// Pre-echo swell ahead of the incoming track
    ReverseVerb { duration_secs: f32 },
    /// Quadratic slowdown to silence
    TapeStop { duration_secs: f32 },
    /// Retrigger the first slice of a bar
    Stutter { division: u32, bars: u32 },
}

impl FxKind {
    pub fn label(&self) -> &'static str {
        match self {
            FxKind::Sweep { .. } => "sweep",
            FxKind::ReverseVerb { .. } => "reverseVerb",
            FxKind::TapeStop { .. } => "tapeStop",
            FxKind::Stutter { .. } => "stutter",
        }
    }
}

/// One scheduled effect. `at_beat` is relative to the transition start and
/// may be negative (pre-roll).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FxDirective {
    pub at_beat: f32,
    #[serde(flatten)]
    pub kind: FxKind,
}

/// The full transition plan the renderer executes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionPlan {
    pub style: TransitionStyle,
    /// Bar offset into track A where the transition starts
    pub start_bar_a: usize,
    /// Bar offset into track B where it enters (currently always 0)
    pub start_bar_b: usize,
    /// Transition length: 4, 8 or 16 bars
    pub length_bars: u32,
    pub tempo_ops: Vec<TempoOp>,
    pub pitch_ops: Vec<PitchOp>,
    /// Effects in application order
    pub fx: Vec<FxDirective>,
}

/// Caller-supplied partial plan; `Some` fields replace the computed ones.
#[derive(Debug, Clone, Default)]
pub struct PlanOverrides {
    pub style: Option<TransitionStyle>,
    pub start_bar_a: Option<usize>,
    pub start_bar_b: Option<usize>,
    pub length_bars: Option<u32>,
    pub tempo_ops: Option<Vec<TempoOp>>,
    pub pitch_ops: Option<Vec<PitchOp>>,
    pub fx: Option<Vec<FxDirective>>,
}

impl PlanOverrides {
    /// Merge onto a computed plan, field-wise.
    pub fn apply(&self, mut plan: TransitionPlan) -> TransitionPlan {
        if let Some(style) = self.style {
            plan.style = style;
        }
        if let Some(bar) = self.start_bar_a {
            plan.start_bar_a = bar;
        }
        if let Some(bar) = self.start_bar_b {
            plan.start_bar_b = bar;
        }
        if let Some(bars) = self.length_bars {
            plan.length_bars = bars;
        }
        if let Some(ops) = &self.tempo_ops {
            plan.tempo_ops = ops.clone();
        }
        if let Some(ops) = &self.pitch_ops {
            plan.pitch_ops = ops.clone();
        }
        if let Some(fx) = &self.fx {
            plan.fx = fx.clone();
        }
        plan
    }
}

/// Decide how to get from track A into track B.
///
/// Style selection, first match wins:
/// 1. both tracks vocal            -> vocal_aware, 4 bars
/// 2. clashing keys, big tempo gap -> hard_downbeat with a pre-sweep, 4 bars
/// 3. matched keys, tiny gap       -> eq_morph, 16 bars in club_smooth else 8
/// 4. matched keys, small gap      -> bass_swap, 8 bars
/// 5. otherwise                    -> stutter_entry in festival, else
///                                    hard_downbeat, 4 bars
pub fn plan(a: &AnalysisSummary, b: &AnalysisSummary, mode: MixMode) -> TransitionPlan {
    let tempo_delta = if a.bpm > 0.0 {
        (a.bpm - b.bpm).abs() / a.bpm
    } else {
        0.0
    };
    let keys_compatible = a.camelot.is_compatible(&b.camelot);
    let both_vocal = a.average_vocal().min(b.average_vocal()) > VOCAL_THRESHOLD;

    let closing = a.closing_energy();
    let opening = b.opening_energy();
    let energy_mismatch = (closing - opening).abs() > ENERGY_MISMATCH;

    let (style, length_bars) = if both_vocal {
        (TransitionStyle::VocalAware, 4)
    } else if !keys_compatible && tempo_delta > TEMPO_GAP_HARD {
        (TransitionStyle::HardDownbeat, 4)
    } else if keys_compatible && tempo_delta < TEMPO_GAP_CLOSE {
        let bars = if mode == MixMode::ClubSmooth { 16 } else { 8 };
        (TransitionStyle::EqMorph, bars)
    } else if keys_compatible && tempo_delta < TEMPO_GAP_HARD {
        (TransitionStyle::BassSwap, 8)
    } else if mode == MixMode::Festival {
        (TransitionStyle::StutterEntry, 4)
    } else {
        (TransitionStyle::HardDownbeat, 4)
    };

    let mut fx = Vec::new();
    if style == TransitionStyle::HardDownbeat {
        fx.push(FxDirective {
            at_beat: -2.0,
            kind: FxKind::Sweep { duration_secs: 1.0 },
        });
    }
    if style == TransitionStyle::StutterEntry {
        fx.push(FxDirective {
            at_beat: -4.0,
            kind: FxKind::Stutter { division: 8, bars: 1 },
        });
    }
    if energy_mismatch && opening > closing && mode == MixMode::Festival {
        fx.push(FxDirective {
            at_beat: -4.0,
            kind: FxKind::ReverseVerb { duration_secs: 2.0 },
        });
    }

    let mut tempo_ops = Vec::new();
    if tempo_delta > TEMPO_GAP_CLOSE && tempo_delta <= TEMPO_GAP_HARD {
        let target = (a.bpm + b.bpm) / 2.0;
        tempo_ops.push(TempoOp {
            track: TrackId::A,
            stretch_percent: (target / a.bpm - 1.0) * 100.0,
        });
        tempo_ops.push(TempoOp {
            track: TrackId::B,
            stretch_percent: (target / b.bpm - 1.0) * 100.0,
        });
    }

    let mut pitch_ops = Vec::new();
    if !keys_compatible && a.camelot.wheel_distance(&b.camelot) <= 1 {
        pitch_ops.push(PitchOp {
            track: TrackId::B,
            semitones: semitone_delta(a.key_semitone, b.key_semitone),
            formant_preserve: true,
        });
    }

    TransitionPlan {
        style,
        start_bar_a: (0.75 * a.bar_count() as f32).floor() as usize,
        start_bar_b: 0,
        length_bars,
        tempo_ops,
        pitch_ops,
        fx,
    }
}

/// Signed semitone shift that moves pitch class `from` onto `to`, wrapped
/// into [-6, 6].
fn semitone_delta(to: u8, from: u8) -> i8 {
    let d = ((to as i32 - from as i32) % 12 + 12) % 12;
    if d > 6 { (d - 12) as i8 } else { d as i8 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segue_analysis::CamelotKey;

    fn summary(bpm: f32, camelot: &str, vocal: f32, energy: f32) -> AnalysisSummary {
        let mut s = AnalysisSummary::fallback();
        s.bpm = bpm;
        s.camelot = CamelotKey::parse(camelot).unwrap();
        s.vocal_likelihood = vec![vocal; 10];
        s.energy_curve = vec![energy; 10];
        // 16 bars so start_bar_a lands at 12
        s.downbeat_indices = (0..16).collect();
        s.beat_times = (0..64).map(|i| i as f32 * 60.0 / bpm).collect();
        s
    }

    #[test]
    fn test_planner_is_pure() {
        let a = summary(124.0, "8A", 0.1, 0.5);
        let b = summary(126.0, "9A", 0.1, 0.5);
        let first = plan(&a, &b, MixMode::Neutral);
        let second = plan(&a, &b, MixMode::Neutral);
        assert_eq!(first, second);
    }

    #[test]
    fn test_both_vocal_wins() {
        let a = summary(120.0, "8A", 0.6, 0.5);
        let b = summary(121.0, "8A", 0.5, 0.5);
        let plan = plan(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::VocalAware);
        assert_eq!(plan.length_bars, 4);
    }

    #[test]
    fn test_same_track_twice_is_eq_morph() {
        let a = summary(126.0, "5B", 0.1, 0.5);
        let b = summary(126.0, "5B", 0.1, 0.5);

        let neutral = plan(&a, &b, MixMode::Neutral);
        assert_eq!(neutral.style, TransitionStyle::EqMorph);
        assert_eq!(neutral.length_bars, 8);
        assert!(neutral.tempo_ops.is_empty());
        assert!(neutral.pitch_ops.is_empty());

        let club = plan(&a, &b, MixMode::ClubSmooth);
        assert_eq!(club.length_bars, 16);
    }

    #[test]
    fn test_tempo_gap_forces_hard_downbeat_with_sweep() {
        // 120 vs 128: delta ~0.067 just over the hard threshold
        let a = summary(120.0, "8A", 0.1, 0.5);
        let b = summary(128.0, "8A", 0.1, 0.5);
        let plan = plan(&a, &b, MixMode::Neutral);

        assert_eq!(plan.style, TransitionStyle::HardDownbeat);
        assert_eq!(plan.length_bars, 4);
        let sweeps: Vec<_> = plan
            .fx
            .iter()
            .filter(|d| matches!(d.kind, FxKind::Sweep { .. }))
            .collect();
        assert_eq!(sweeps.len(), 1);
        assert_eq!(sweeps[0].at_beat, -2.0);
    }

    #[test]
    fn test_incompatible_far_keys_skip_pitch_shift() {
        // 1A vs 7A: opposite sides of the wheel
        let a = summary(120.0, "1A", 0.1, 0.5);
        let b = summary(140.0, "7A", 0.1, 0.5);
        let plan = plan(&a, &b, MixMode::Neutral);

        assert_eq!(plan.style, TransitionStyle::HardDownbeat);
        assert!(plan.pitch_ops.is_empty());
        assert!(plan.fx.iter().any(|d| matches!(d.kind, FxKind::Sweep { .. })));
    }

    #[test]
    fn test_near_keys_request_pitch_shift() {
        // 8A vs 9B: one wheel step apart but not compatible (mode differs)
        let mut a = summary(120.0, "8A", 0.1, 0.5);
        a.key_semitone = 0; // A minor
        let mut b = summary(140.0, "9B", 0.1, 0.5);
        b.key_semitone = 10; // G major
        let plan = plan(&a, &b, MixMode::Neutral);

        assert_eq!(plan.pitch_ops.len(), 1);
        let op = plan.pitch_ops[0];
        assert_eq!(op.track, TrackId::B);
        assert_eq!(op.semitones, 2);
        assert!(op.formant_preserve);
    }

    #[test]
    fn test_festival_stutter_entry_with_reverse_verb() {
        // Scenario: 124 vs 126, incompatible keys, B noticeably louder
        let a = summary(124.0, "3A", 0.1, 0.2);
        let b = summary(126.0, "9B", 0.1, 0.8);
        let plan = plan(&a, &b, MixMode::Festival);

        assert_eq!(plan.style, TransitionStyle::StutterEntry);
        let stutter = plan
            .fx
            .iter()
            .find(|d| matches!(d.kind, FxKind::Stutter { .. }))
            .expect("stutter directive");
        assert_eq!(stutter.at_beat, -4.0);
        assert!(matches!(stutter.kind, FxKind::Stutter { division: 8, bars: 1 }));

        let verb = plan
            .fx
            .iter()
            .find(|d| matches!(d.kind, FxKind::ReverseVerb { .. }))
            .expect("reverse verb directive");
        assert_eq!(verb.at_beat, -4.0);
    }

    #[test]
    fn test_neutral_mode_same_inputs_stays_hard() {
        let a = summary(124.0, "3A", 0.1, 0.2);
        let b = summary(126.0, "9B", 0.1, 0.8);
        let plan = plan(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::HardDownbeat);
        // The reverse verb is festival-only
        assert!(!plan.fx.iter().any(|d| matches!(d.kind, FxKind::ReverseVerb { .. })));
    }

    #[test]
    fn test_compatible_small_gap_is_bass_swap_with_tempo_ops() {
        // 120 vs 125: delta ~0.042 inside (0.02, 0.06]
        let a = summary(120.0, "8A", 0.1, 0.5);
        let b = summary(125.0, "8B", 0.1, 0.5);
        let plan = plan(&a, &b, MixMode::Neutral);

        assert_eq!(plan.style, TransitionStyle::BassSwap);
        assert_eq!(plan.length_bars, 8);
        assert_eq!(plan.tempo_ops.len(), 2);
        // Both tracks pull toward 122.5
        assert!(plan.tempo_ops[0].stretch_percent > 0.0);
        assert!(plan.tempo_ops[1].stretch_percent < 0.0);
    }

    #[test]
    fn test_start_bar_defaults() {
        let a = summary(120.0, "8A", 0.1, 0.5);
        let b = summary(120.0, "8A", 0.1, 0.5);
        let plan = plan(&a, &b, MixMode::Neutral);
        // 16 bars observed -> start at bar 12
        assert_eq!(plan.start_bar_a, 12);
        assert_eq!(plan.start_bar_b, 0);
    }

    #[test]
    fn test_fallback_pair_plans_eq_morph() {
        // Two silent tracks: fallback summaries, identical keys and tempo
        let a = AnalysisSummary::fallback();
        let b = AnalysisSummary::fallback();
        let plan = plan(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::EqMorph);
    }

    #[test]
    fn test_overrides_replace_field_wise() {
        let a = summary(120.0, "8A", 0.1, 0.5);
        let b = summary(120.0, "8A", 0.1, 0.5);
        let computed = plan(&a, &b, MixMode::Neutral);

        let overrides = PlanOverrides {
            style: Some(TransitionStyle::VocalAware),
            length_bars: Some(4),
            ..Default::default()
        };
        let merged = overrides.apply(computed.clone());

        assert_eq!(merged.style, TransitionStyle::VocalAware);
        assert_eq!(merged.length_bars, 4);
        // Untouched fields survive
        assert_eq!(merged.start_bar_a, computed.start_bar_a);
        assert_eq!(merged.fx, computed.fx);
    }

    #[test]
    fn test_semitone_delta_wraps() {
        assert_eq!(semitone_delta(0, 10), 2);
        assert_eq!(semitone_delta(10, 0), -2);
        assert_eq!(semitone_delta(6, 0), 6);
        assert_eq!(semitone_delta(7, 0), -5);
        assert_eq!(semitone_delta(3, 3), 0);
    }
}
