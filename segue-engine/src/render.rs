//! Mix renderer: analysis, planning, effects, crossfade, mastering
//!
//! Stages run strictly in order and each writes into buffers it owns, so
//! a failed or cancelled render never leaves shared state corrupted. The
//! two analyses run concurrently; everything else is single-threaded.

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use segue_analysis::{AnalysisSummary, TrackAnalyzer};

use crate::buffer::PcmBuffer;
use crate::crossfade::{splice, CrossfadeCurve};
use crate::error::MergeError;
use crate::fx;
use crate::mastering::{
    bass_mono, normalize_loudness, phase_correlation, true_peak_limit, GlueCompressor,
    TargetLoudness, TruePeakCeiling,
};
use crate::plan::{plan, FxKind, MixMode, PlanOverrides, TransitionPlan, TransitionStyle};

/// Bass-mono cutoff used when the trigger fires, Hz.
const BASS_MONO_CUTOFF: f32 = 120.0;
/// Phase correlation below which bass mono-ization kicks in.
const CORRELATION_TRIGGER: f32 = -0.3;

/// Everything `merge` needs beyond the two buffers.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Requested crossfade length; clamped by available material
    pub crossfade_seconds: f32,
    pub mode: MixMode,
    pub target_loudness: TargetLoudness,
    pub ceiling: TruePeakCeiling,
    /// Seed for the noise-sweep generator; fixed seed -> identical render
    pub noise_seed: u64,
    /// Partial plan merged field-wise over the computed one
    pub plan_override: Option<PlanOverrides>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            crossfade_seconds: 8.0,
            mode: MixMode::default(),
            target_loudness: TargetLoudness::default(),
            ceiling: TruePeakCeiling::default(),
            noise_seed: 0,
            plan_override: None,
        }
    }
}

/// What actually happened during rendering, for the mix report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderReport {
    /// Effects that ran, by label
    pub fx_applied: Vec<String>,
    /// Effects that were skipped, with the reason
    pub fx_skipped: Vec<String>,
    /// Advisory operations recorded but not realized
    pub advisory_notes: Vec<String>,
    /// Pre-fade mid/side correlation over the crossfade window
    pub phase_correlation: f32,
    pub bass_mono_applied: bool,
    /// Loudness of the final output, simplified LUFS
    pub output_lufs: f32,
}

/// The rendered mix plus everything used to produce it.
#[derive(Debug, Clone)]
pub struct MergedResult {
    pub output: PcmBuffer,
    /// The plan as executed (after overrides and clamping)
    pub plan: TransitionPlan,
    pub analysis_a: AnalysisSummary,
    pub analysis_b: AnalysisSummary,
    pub report: RenderReport,
}

/// Merge two decoded tracks into one mastered mix.
///
/// Fails only at the input boundary (empty buffer, zero or mismatched
/// sample rate) or on an analyzer bug (non-finite tempo). Per-effect
/// problems are logged, recorded in the report and skipped.
pub fn merge(a: PcmBuffer, b: PcmBuffer, options: &MergeOptions) -> Result<MergedResult, MergeError> {
    check_input(&a, "A")?;
    check_input(&b, "B")?;
    if a.sample_rate != b.sample_rate {
        return Err(MergeError::SampleRateMismatch(a.sample_rate, b.sample_rate));
    }

    // Independent read-only inputs: analyze both tracks concurrently
    let (analysis_a, analysis_b) = rayon::join(
        || TrackAnalyzer::new(a.sample_rate).analyze(&a.channels),
        || TrackAnalyzer::new(b.sample_rate).analyze(&b.channels),
    );
    check_tempo(&analysis_a, "A")?;
    check_tempo(&analysis_b, "B")?;

    let mut plan = plan(&analysis_a, &analysis_b, options.mode);
    if let Some(overrides) = &options.plan_override {
        plan = overrides.apply(plan);
    }

    let beat_len = 60.0 / analysis_a.bpm;
    let bar_len = 4.0 * beat_len;
    let bars_in_a = ((a.duration_secs() / bar_len) as usize).max(1);
    plan.start_bar_a = plan.start_bar_a.min(bars_in_a - 1);

    let mut report = RenderReport::default();
    let mut a = a;
    let mut b = b;
    let transition_secs = plan.start_bar_a as f32 * bar_len;

    // Apply planned effects in order. A-side effects resolve their time on
    // A's tempo grid; the stutter retriggers B's head on B's own tempo.
    let mut rng = StdRng::seed_from_u64(options.noise_seed);
    for directive in &plan.fx {
        let label = directive.kind.label();
        let fx_time = transition_secs + directive.at_beat * beat_len;
        if !fx_time.is_finite() || fx_time < 0.0 {
            tracing::warn!(label, fx_time, "effect scheduled before the mix start, skipped");
            report.fx_skipped.push(format!("{label}: resolved to t={fx_time:.2}s"));
            continue;
        }

        let applied = match directive.kind {
            FxKind::Sweep { duration_secs } => {
                fx::noise_sweep(&mut a, fx_time, duration_secs, &mut rng)
            }
            FxKind::ReverseVerb { duration_secs } => {
                fx::reverse_reverb(&mut a, fx_time, duration_secs)
            }
            FxKind::TapeStop { duration_secs } => fx::tape_stop(&mut a, fx_time, duration_secs),
            FxKind::Stutter { division, bars } => {
                fx::stutter(&mut b, 0.0, division, bars, analysis_b.bpm)
            }
        };

        if applied {
            report.fx_applied.push(label.to_string());
        } else {
            report.fx_skipped.push(format!("{label}: rejected parameters"));
        }
    }

    for op in &plan.tempo_ops {
        report.advisory_notes.push(format!(
            "tempo op on {:?} ({:+.2}%) recorded, stretch not realized",
            op.track, op.stretch_percent
        ));
    }
    for op in &plan.pitch_ops {
        report.advisory_notes.push(format!(
            "pitch op on {:?} ({:+} st) recorded, shift not realized",
            op.track, op.semitones
        ));
    }

    if plan.style == TransitionStyle::EqMorph {
        let morph_secs = plan.length_bars as f32 * bar_len;
        fx::eq_morph(&mut a, &mut b, transition_secs, morph_secs);
    }

    let sr = a.sample_rate as f32;
    let overlap_start = ((transition_secs * sr) as usize).min(a.frames());
    let requested = (options.crossfade_seconds.max(0.0) * sr) as usize;
    let crossfade_samples = requested
        .min(a.frames() - overlap_start)
        .min(b.frames());

    // Correlation is read pre-fade over the window the splice actually
    // sums: the bass-mono trigger has to see the tracks as they will mix,
    // not A material the output never carries
    report.phase_correlation = phase_correlation(&a, &b, overlap_start, crossfade_samples);

    let curve = CrossfadeCurve::for_style(plan.style);
    let mut output = splice(&a, &b, overlap_start, crossfade_samples, curve);

    report.bass_mono_applied =
        plan.style == TransitionStyle::BassSwap || report.phase_correlation < CORRELATION_TRIGGER;
    if report.bass_mono_applied {
        tracing::debug!(
            correlation = report.phase_correlation,
            "bass mono-izing the output"
        );
        bass_mono(&mut output, BASS_MONO_CUTOFF);
    }

    GlueCompressor::default().process(&mut output);
    normalize_loudness(&mut output, options.target_loudness.db());
    true_peak_limit(&mut output, options.ceiling.db());
    report.output_lufs = crate::mastering::measure_lufs(&output);

    Ok(MergedResult {
        output,
        plan,
        analysis_a,
        analysis_b,
        report,
    })
}

fn check_input(buf: &PcmBuffer, track: &'static str) -> Result<(), MergeError> {
    if buf.is_empty() {
        return Err(MergeError::EmptyTrack(track));
    }
    if buf.sample_rate == 0 {
        return Err(MergeError::InvalidSampleRate(track));
    }
    Ok(())
}

fn check_tempo(summary: &AnalysisSummary, track: &'static str) -> Result<(), MergeError> {
    if !summary.bpm.is_finite() || summary.bpm <= 0.0 {
        return Err(MergeError::UnusableTempo(track, summary.bpm));
    }
    Ok(())
}
