//! Track analysis for segue
//!
//! Turns decoded PCM into an [`AnalysisSummary`]: an onset-based beat grid,
//! tempo and key estimates with confidence scores, a smoothed energy
//! envelope, a per-frame vocal likelihood, and kick-refined beat times.
//!
//! Every entry point is total: pathological input (silence, a handful of
//! samples, non-finite garbage) produces a usable fallback summary instead
//! of an error, so downstream planning never has to handle analysis failure.

mod beatgrid;
mod camelot;
mod energy;
mod key;
mod spectral;
mod summary;

pub use beatgrid::{downbeats, fallback_grid, phrases, tempo_from_beats, BeatAnalyzer, TempoEstimate};
pub use camelot::CamelotKey;
pub use energy::{energy_curve, VocalDetector};
pub use key::{DetectedKey, KeyAnalyzer};
pub use spectral::{is_local_peak, SpectrumAnalyzer};
pub use summary::{AnalysisSummary, PhraseSpan, TrackAnalyzer};
