//! Audio file decoding via symphonia
//!
//! Probes the container, decodes the first audio track to f32 and hands
//! back a planar buffer. `load_pair` brings two inputs onto a common
//! sample rate (the higher of the two) so the engine can merge them.

use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use segue_engine::PcmBuffer;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no audio track found in file")]
    NoAudioTrack,

    #[error("decode error: {0}")]
    Decode(String),

    #[error("decoded stream was empty")]
    EmptyStream,

    #[error("resampling failed: {0}")]
    Resample(String),
}

/// Decode one file to a planar buffer at its native sample rate.
pub fn load_track(path: &Path) -> Result<PcmBuffer, DecodeError> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Decode(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params.sample_rate.unwrap_or(44100);
    let channels = codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(2)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Decode(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(_) => break,
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(_) => continue,
        };

        let spec = *decoded.spec();
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if samples.is_empty() {
        return Err(DecodeError::EmptyStream);
    }

    tracing::debug!(
        path = %path.display(),
        sample_rate,
        channels,
        frames = samples.len() / channels,
        "decoded track"
    );
    Ok(PcmBuffer::from_interleaved(sample_rate, channels, &samples))
}

/// Load two files and resample the lower-rate one so both share a rate.
pub fn load_pair(a: &Path, b: &Path) -> Result<(PcmBuffer, PcmBuffer), DecodeError> {
    let track_a = load_track(a)?;
    let track_b = load_track(b)?;

    let target = track_a.sample_rate.max(track_b.sample_rate);
    let track_a = resample(track_a, target)?;
    let track_b = resample(track_b, target)?;
    Ok((track_a, track_b))
}

/// Resample a buffer to `target_rate`. A matching rate passes through.
pub fn resample(buf: PcmBuffer, target_rate: u32) -> Result<PcmBuffer, DecodeError> {
    use rubato::{FftFixedInOut, Resampler};

    if buf.sample_rate == target_rate || buf.is_empty() {
        return Ok(buf);
    }

    let channel_count = buf.channel_count().max(1);
    let mut resampler = FftFixedInOut::<f32>::new(
        buf.sample_rate as usize,
        target_rate as usize,
        1024,
        channel_count,
    )
    .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let frames = buf.frames();
    let chunk = resampler.input_frames_next();
    let mut output: Vec<Vec<f32>> = vec![Vec::new(); channel_count];

    let mut pos = 0;
    while pos + chunk <= frames {
        let input: Vec<&[f32]> = buf.channels.iter().map(|c| &c[pos..pos + chunk]).collect();
        let resampled = resampler
            .process(&input, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        for (c, data) in resampled.into_iter().enumerate() {
            output[c].extend(data);
        }
        pos += chunk;
    }

    // Zero-pad the final partial chunk, then keep only the frames that
    // correspond to real input
    if pos < frames {
        let remaining = frames - pos;
        let padded: Vec<Vec<f32>> = buf
            .channels
            .iter()
            .map(|c| {
                let mut tail = c[pos..].to_vec();
                tail.resize(chunk, 0.0);
                tail
            })
            .collect();
        let input: Vec<&[f32]> = padded.iter().map(Vec::as_slice).collect();
        let resampled = resampler
            .process(&input, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;

        let keep = remaining * target_rate as usize / buf.sample_rate as usize;
        for (c, data) in resampled.into_iter().enumerate() {
            output[c].extend(&data[..keep.min(data.len())]);
        }
    }

    Ok(PcmBuffer::new(target_rate, output))
}
