//! 16-bit WAV emission and round-trip reading
//!
//! The writer produces the canonical 44-byte PCM16 header. Samples are
//! clamped to [-1, 1] and converted with the asymmetric law
//! `x < 0 ? x * 0x8000 : x * 0x7FFF`, so decoding the file recovers the
//! float signal within one LSB.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;

use segue_engine::PcmBuffer;

#[derive(Error, Debug)]
pub enum WavError {
    #[error("buffer has no channels")]
    NoChannels,

    #[error("unsupported WAV layout: {0}")]
    UnsupportedLayout(String),

    #[error("WAV I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),
}

/// Asymmetric float-to-i16 conversion.
#[inline]
fn to_i16(x: f32) -> i16 {
    let x = x.clamp(-1.0, 1.0);
    if x < 0.0 {
        (x * 32768.0) as i16
    } else {
        (x * 32767.0) as i16
    }
}

/// The matching i16-to-float conversion.
#[inline]
fn from_i16(s: i16) -> f32 {
    if s < 0 {
        s as f32 / 32768.0
    } else {
        s as f32 / 32767.0
    }
}

/// Encode a buffer as interleaved PCM16 WAV bytes.
pub fn encode_wav16(buf: &PcmBuffer) -> Result<Vec<u8>, WavError> {
    if buf.channel_count() == 0 {
        return Err(WavError::NoChannels);
    }

    let spec = WavSpec {
        channels: buf.channel_count() as u16,
        sample_rate: buf.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec)?;
    for frame in 0..buf.frames() {
        for channel in &buf.channels {
            writer.write_sample(to_i16(channel[frame]))?;
        }
    }
    writer.finalize()?;

    Ok(bytes)
}

/// Encode and write a buffer to `path`.
pub fn write_wav16(buf: &PcmBuffer, path: &Path) -> Result<(), WavError> {
    let bytes = encode_wav16(buf)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read PCM16 WAV bytes back into a planar buffer.
pub fn read_wav16(bytes: &[u8]) -> Result<PcmBuffer, WavError> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    if spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(WavError::UnsupportedLayout(format!(
            "{} bit {:?}",
            spec.bits_per_sample, spec.sample_format
        )));
    }

    let samples: Vec<f32> = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<i16>, _>>()?
        .into_iter()
        .map(from_i16)
        .collect();

    Ok(PcmBuffer::from_interleaved(
        spec.sample_rate,
        spec.channels as usize,
        &samples,
    ))
}
