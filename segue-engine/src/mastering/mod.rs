//! Mastering tail: loudness, glue compression, limiting, bass management
//!
//! Applied by the renderer in a fixed order: glue compression, loudness
//! normalization, then the true-peak limiter. Bass mono-ization runs
//! earlier, triggered by the plan style or a negative phase correlation.

mod bass_mono;
mod compressor;
mod correlation;
mod limiter;
mod loudness;

pub use bass_mono::bass_mono;
pub use compressor::GlueCompressor;
pub use correlation::phase_correlation;
pub use limiter::true_peak_limit;
pub use loudness::{measure_lufs, normalize_loudness};

use serde::Serialize;

/// Output loudness targets, LUFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetLoudness {
    /// -14 LUFS, streaming-friendly
    #[default]
    Lufs14,
    /// -12 LUFS
    Lufs12,
    /// -9 LUFS, loud club master
    Lufs9,
}

impl TargetLoudness {
    pub fn db(self) -> f32 {
        match self {
            TargetLoudness::Lufs14 => -14.0,
            TargetLoudness::Lufs12 => -12.0,
            TargetLoudness::Lufs9 => -9.0,
        }
    }
}

/// True-peak ceiling choices, dBTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruePeakCeiling {
    /// -1.0 dBTP
    #[default]
    Db1_0,
    /// -0.5 dBTP
    Db0_5,
    /// -0.1 dBTP
    Db0_1,
}

impl TruePeakCeiling {
    pub fn db(self) -> f32 {
        match self {
            TruePeakCeiling::Db1_0 => -1.0,
            TruePeakCeiling::Db0_5 => -0.5,
            TruePeakCeiling::Db0_1 => -0.1,
        }
    }
}

/// Convert dB to linear amplitude.
#[inline]
pub(crate) fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_values() {
        assert_eq!(TargetLoudness::default().db(), -14.0);
        assert_eq!(TargetLoudness::Lufs9.db(), -9.0);
        assert_eq!(TruePeakCeiling::default().db(), -1.0);
        assert_eq!(TruePeakCeiling::Db0_1.db(), -0.1);
    }

    #[test]
    fn test_db_to_linear() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(-6.0) - 0.5012).abs() < 1e-3);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-6);
    }
}
