//! Style-aware crossfading and the output splice

use crate::buffer::PcmBuffer;
use crate::plan::TransitionStyle;

/// Gain-curve family for the crossfade region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeCurve {
    /// Smoothstep S-curve; gains sum to 1
    SCurve,
    /// Straight lines; gains sum to 1
    Linear,
    /// cos/sin quarter-wave; squared gains sum to 1
    EqualPower,
}

impl CrossfadeCurve {
    /// The curve each transition style fades with.
    pub fn for_style(style: TransitionStyle) -> Self {
        match style {
            TransitionStyle::HardDownbeat => CrossfadeCurve::SCurve,
            TransitionStyle::VocalAware => CrossfadeCurve::Linear,
            _ => CrossfadeCurve::EqualPower,
        }
    }

    /// Outgoing gain at progress `x` in [0, 1].
    pub fn gain_a(self, x: f32) -> f32 {
        match self {
            CrossfadeCurve::SCurve => 1.0 - smoothstep(x),
            CrossfadeCurve::Linear => 1.0 - x,
            CrossfadeCurve::EqualPower => (std::f32::consts::PI * x / 2.0).cos(),
        }
    }

    /// Incoming gain at progress `x` in [0, 1].
    pub fn gain_b(self, x: f32) -> f32 {
        match self {
            CrossfadeCurve::SCurve => smoothstep(x),
            CrossfadeCurve::Linear => x,
            CrossfadeCurve::EqualPower => (std::f32::consts::PI * x / 2.0).sin(),
        }
    }
}

/// s(x) = x^2 (3 - 2x)
#[inline]
fn smoothstep(x: f32) -> f32 {
    x * x * (3.0 - 2.0 * x)
}

/// Splice A and B into one buffer: A up to `overlap_start`, a faded
/// overlap of `crossfade_samples`, then the rest of B.
///
/// The output carries `max` of the two channel counts; a mono input feeds
/// every output channel through its first channel. The result length is
/// exactly `overlap_start + b.frames()`.
pub fn splice(
    a: &PcmBuffer,
    b: &PcmBuffer,
    overlap_start: usize,
    crossfade_samples: usize,
    curve: CrossfadeCurve,
) -> PcmBuffer {
    let overlap_start = overlap_start.min(a.frames());
    let crossfade = crossfade_samples
        .min(a.frames() - overlap_start)
        .min(b.frames());

    let channel_count = a.channel_count().max(b.channel_count()).max(1);
    let total = overlap_start + b.frames();
    let mut channels = Vec::with_capacity(channel_count);

    for c in 0..channel_count {
        let ca = a.channel_or_first(c);
        let cb = b.channel_or_first(c);
        let mut out = Vec::with_capacity(total);

        out.extend_from_slice(&ca[..overlap_start.min(ca.len())]);
        out.resize(overlap_start, 0.0);

        for i in 0..crossfade {
            let x = i as f32 / crossfade as f32;
            let av = ca.get(overlap_start + i).copied().unwrap_or(0.0);
            let bv = cb.get(i).copied().unwrap_or(0.0);
            out.push(av * curve.gain_a(x) + bv * curve.gain_b(x));
        }

        out.extend_from_slice(&cb[crossfade.min(cb.len())..]);
        out.resize(total, 0.0);
        channels.push(out);
    }

    PcmBuffer::new(a.sample_rate, channels)
}
