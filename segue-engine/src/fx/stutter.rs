//! Stutter: retrigger the first slice of a bar-length span

use crate::buffer::PcmBuffer;

/// Partition `[start, start + bars * 4 * 60/bpm)` into `division` equal
/// slices and replay the first slice into every other one.
///
/// Slice length derives from the target track's own tempo; a non-positive
/// or non-finite `bpm` makes the whole effect a no-op.
pub fn stutter(
    buf: &mut PcmBuffer,
    start_secs: f32,
    division: u32,
    bars: u32,
    bpm: f32,
) -> bool {
    if !bpm.is_finite() || bpm <= 0.0 {
        tracing::warn!(bpm, "stutter rejected: unusable tempo");
        return false;
    }
    if !start_secs.is_finite() || start_secs < 0.0 || division == 0 || bars == 0 {
        tracing::warn!(start_secs, division, bars, "stutter rejected: invalid parameters");
        return false;
    }

    let sr = buf.sample_rate as f32;
    let start = (start_secs * sr) as usize;
    let span_secs = bars as f32 * 4.0 * 60.0 / bpm;
    let end = (start + (span_secs * sr) as usize).min(buf.frames());
    if end <= start {
        tracing::debug!(start, end, "stutter outside buffer, skipped");
        return false;
    }

    let slice = (end - start) / division as usize;
    if slice == 0 {
        tracing::debug!("stutter span too short to slice, skipped");
        return false;
    }

    for channel in &mut buf.channels {
        let first: Vec<f32> = channel[start..start + slice].to_vec();
        for n in 1..division as usize {
            let dst = start + n * slice;
            for (j, &v) in first.iter().enumerate() {
                if dst + j >= end {
                    break;
                }
                channel[dst + j] = v;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slices_repeat_first() {
        // 120 BPM, 1 bar = 2 s = 2000 frames at a toy rate, division 4
        let sr = 1000;
        let channel: Vec<f32> = (0..2500).map(|i| i as f32 / 2500.0).collect();
        let mut buf = PcmBuffer::new(sr, vec![channel]);
        assert!(stutter(&mut buf, 0.0, 4, 1, 120.0));

        let slice = 500;
        for n in 1..4 {
            for j in 0..slice {
                assert_eq!(
                    buf.channels[0][n * slice + j],
                    buf.channels[0][j],
                    "slice {} sample {} should replay slice 0",
                    n,
                    j
                );
            }
        }
        // Material after the span is untouched
        assert_eq!(buf.channels[0][2400], 2400.0 / 2500.0);
    }

    #[test]
    fn test_zero_bpm_is_noop() {
        let mut buf = PcmBuffer::new(44100, vec![vec![0.5; 44100]]);
        let original = buf.clone();
        assert!(!stutter(&mut buf, 0.0, 8, 1, 0.0));
        assert!(!stutter(&mut buf, 0.0, 8, 1, f32::NAN));
        assert_eq!(buf, original);
    }

    #[test]
    fn test_invalid_params_noop() {
        let mut buf = PcmBuffer::new(44100, vec![vec![0.5; 44100]]);
        let original = buf.clone();
        assert!(!stutter(&mut buf, -1.0, 8, 1, 128.0));
        assert!(!stutter(&mut buf, 0.0, 0, 1, 128.0));
        assert!(!stutter(&mut buf, 0.0, 8, 0, 128.0));
        assert_eq!(buf, original);
    }

    #[test]
    fn test_span_clamped_to_buffer() {
        // Buffer shorter than one bar: the span clamps and still stutters
        let mut buf = PcmBuffer::new(1000, vec![(0..1000).map(|i| i as f32).collect()]);
        assert!(stutter(&mut buf, 0.0, 4, 1, 120.0));
        // Clamped span is 1000 frames -> slices of 250
        assert_eq!(buf.channels[0][250], 0.0);
        assert_eq!(buf.channels[0][500], 0.0);
    }
}
