//! Mid/side phase correlation between the two tracks over their overlap
//!
//! Used purely as a trigger: a strongly negative value predicts low-end
//! cancellation when the tracks sum, which the renderer answers with
//! bass mono-ization.

use crate::buffer::PcmBuffer;

/// Mean of `mid * side` across the overlap, where mid and side are built
/// from both tracks' left/right pairs. Mono tracks feed both sides of the
/// pair. Empty overlap yields 0.
pub fn phase_correlation(a: &PcmBuffer, b: &PcmBuffer, a_offset: usize, len: usize) -> f32 {
    let la = a.channel_or_first(0);
    let ra = a.channel_or_first(1);
    let lb = b.channel_or_first(0);
    let rb = b.channel_or_first(1);

    let mut sum = 0.0f64;
    let mut count = 0usize;
    for i in 0..len {
        let ai = a_offset + i;
        if ai >= la.len() || i >= lb.len() {
            break;
        }
        let mid = 0.25 * (la[ai] + ra[ai] + lb[i] + rb[i]);
        let side = 0.25 * (la[ai] - ra[ai] + lb[i] - rb[i]);
        sum += (mid * side) as f64;
        count += 1;
    }

    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}
