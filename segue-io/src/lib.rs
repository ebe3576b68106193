//! Decode and encode boundaries for segue
//!
//! The engine's contract is PCM-in, PCM-out. This crate supplies both
//! ends: a symphonia-based decoder that turns container files into planar
//! [`segue_engine::PcmBuffer`]s (resampling a mismatched pair to a common
//! rate), and the 16-bit WAV writer for the mastered result.

mod decode;
mod wav;

pub use decode::{load_pair, load_track, resample, DecodeError};
pub use wav::{encode_wav16, read_wav16, write_wav16, WavError};
