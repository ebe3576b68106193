//! segue - merge two tracks into one mastered mix

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use segue_analysis::AnalysisSummary;
use segue_engine::{
    merge, MergeOptions, MixMode, RenderReport, TargetLoudness, TransitionPlan, TruePeakCeiling,
};

#[derive(Parser, Debug)]
#[command(name = "segue", about = "Analyze two tracks and render an intelligent transition")]
struct Cli {
    /// Outgoing track
    track_a: PathBuf,

    /// Incoming track
    track_b: PathBuf,

    /// Output WAV file (PCM16)
    #[arg(short, long, default_value = "mix.wav")]
    output: PathBuf,

    /// Mixing mode
    #[arg(short, long, value_enum, default_value = "neutral")]
    mode: ModeArg,

    /// Requested crossfade length in seconds (clamped by the material)
    #[arg(short, long, default_value_t = 8.0)]
    crossfade: f32,

    /// Target loudness in LUFS
    #[arg(long, value_enum, default_value = "14")]
    loudness: LoudnessArg,

    /// True-peak ceiling in dBTP
    #[arg(long, value_enum, default_value = "1.0")]
    ceiling: CeilingArg,

    /// Noise-sweep seed; a fixed seed reproduces the render exactly
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write the analysis/plan report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    Festival,
    ClubSmooth,
    Neutral,
}

impl From<ModeArg> for MixMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Festival => MixMode::Festival,
            ModeArg::ClubSmooth => MixMode::ClubSmooth,
            ModeArg::Neutral => MixMode::Neutral,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum LoudnessArg {
    #[value(name = "14")]
    L14,
    #[value(name = "12")]
    L12,
    #[value(name = "9")]
    L9,
}

impl From<LoudnessArg> for TargetLoudness {
    fn from(arg: LoudnessArg) -> Self {
        match arg {
            LoudnessArg::L14 => TargetLoudness::Lufs14,
            LoudnessArg::L12 => TargetLoudness::Lufs12,
            LoudnessArg::L9 => TargetLoudness::Lufs9,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum CeilingArg {
    #[value(name = "1.0")]
    C1_0,
    #[value(name = "0.5")]
    C0_5,
    #[value(name = "0.1")]
    C0_1,
}

impl From<CeilingArg> for TruePeakCeiling {
    fn from(arg: CeilingArg) -> Self {
        match arg {
            CeilingArg::C1_0 => TruePeakCeiling::Db1_0,
            CeilingArg::C0_5 => TruePeakCeiling::Db0_5,
            CeilingArg::C0_1 => TruePeakCeiling::Db0_1,
        }
    }
}

/// Everything the JSON report carries.
#[derive(Serialize)]
struct MixReport<'a> {
    plan: &'a TransitionPlan,
    analysis_a: &'a AnalysisSummary,
    analysis_b: &'a AnalysisSummary,
    render: &'a RenderReport,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!("decoding {} and {}", cli.track_a.display(), cli.track_b.display());
    let (a, b) = segue_io::load_pair(&cli.track_a, &cli.track_b)
        .context("failed to decode input tracks")?;

    let options = MergeOptions {
        crossfade_seconds: cli.crossfade,
        mode: cli.mode.into(),
        target_loudness: cli.loudness.into(),
        ceiling: cli.ceiling.into(),
        noise_seed: cli.seed,
        plan_override: None,
    };

    tracing::info!("rendering transition");
    let result = merge(a, b, &options).context("merge failed")?;

    segue_io::write_wav16(&result.output, &cli.output)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    println!(
        "A: {:.1} BPM ({:.0}% conf), key {}",
        result.analysis_a.bpm,
        result.analysis_a.bpm_confidence * 100.0,
        result.analysis_a.camelot,
    );
    println!(
        "B: {:.1} BPM ({:.0}% conf), key {}",
        result.analysis_b.bpm,
        result.analysis_b.bpm_confidence * 100.0,
        result.analysis_b.camelot,
    );
    println!(
        "plan: {:?} over {} bars from bar {}, fx applied: [{}]",
        result.plan.style,
        result.plan.length_bars,
        result.plan.start_bar_a,
        result.report.fx_applied.join(", "),
    );
    println!(
        "output: {} ({:.1} s, {:.1} LUFS)",
        cli.output.display(),
        result.output.duration_secs(),
        result.report.output_lufs,
    );

    if let Some(report_path) = &cli.report {
        let report = MixReport {
            plan: &result.plan,
            analysis_a: &result.analysis_a,
            analysis_b: &result.analysis_b,
            render: &result.report,
        };
        let file = std::fs::File::create(report_path)
            .with_context(|| format!("failed to create {}", report_path.display()))?;
        serde_json::to_writer_pretty(file, &report).context("failed to serialize report")?;
        tracing::info!("report written to {}", report_path.display());
    }

    Ok(())
}
