//! Planar PCM buffer model
//!
//! Channels are stored as separate `Vec<f32>` of equal length. Analyzers
//! borrow the channel data read-only; effect passes take the buffer by
//! `&mut` so mutation happens under unique ownership.

/// A decoded PCM clip: planar float channels at one sample rate.
///
/// Samples are nominally in [-1, 1] but may transiently exceed it until
/// the limiter runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl PcmBuffer {
    /// Wrap planar channel data. All channels must share one length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        debug_assert!(
            channels.windows(2).all(|w| w[0].len() == w[1].len()),
            "channels must be equal length"
        );
        Self { sample_rate, channels }
    }

    /// All-zero buffer with the given shape.
    pub fn silent(sample_rate: u32, channel_count: usize, frames: usize) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frames]; channel_count],
        }
    }

    /// De-interleave `samples` into `channel_count` planar channels.
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(sample_rate: u32, channel_count: usize, samples: &[f32]) -> Self {
        if channel_count == 0 {
            return Self { sample_rate, channels: Vec::new() };
        }
        let frames = samples.len() / channel_count;
        let channels = (0..channel_count)
            .map(|c| (0..frames).map(|f| samples[f * channel_count + c]).collect())
            .collect();
        Self { sample_rate, channels }
    }

    /// Interleave the channels frame by frame.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let frames = self.frames();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for f in 0..frames {
            for channel in &self.channels {
                out.push(channel[f]);
            }
        }
        out
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Channel `index`, falling back to the first channel when the buffer
    /// has fewer. This is how a mono track feeds both sides of a stereo
    /// operation.
    pub fn channel_or_first(&self, index: usize) -> &[f32] {
        self.channels
            .get(index)
            .or_else(|| self.channels.first())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |m, s| m.max(s.abs()))
    }
}
