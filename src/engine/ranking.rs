//! Top-k-above-threshold selection over quantized scores.

use super::output::Recognition;
use crate::models::Labels;

/// Largest value a quantized score can take.
pub const QUANT_SCALE: f64 = 255.0;

/// Normalize a quantized score to [0, 1].
#[inline]
pub fn confidence(score: u8) -> f64 {
    f64::from(score) / QUANT_SCALE
}

/// Rank `scores` against `labels`.
///
/// Keeps entries whose confidence is strictly greater than `threshold`,
/// sorts them by confidence descending (ties by ascending class index) and
/// returns at most `limit` of them. Indices past the end of `labels` are
/// reported as `"unknown"`.
pub fn top_above_threshold(
    scores: &[u8],
    labels: &Labels,
    limit: usize,
    threshold: f64,
) -> Vec<Recognition> {
    let mut kept: Vec<(usize, u8)> = scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| confidence(score) > threshold)
        .map(|(index, &score)| (index, score))
        .collect();

    // Quantized scores order the same way as their confidences, and the
    // integer compare gives a total order for the tie-break.
    kept.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    kept.truncate(limit);

    kept.into_iter()
        .map(|(index, score)| Recognition::new(labels.label_for(index), confidence(score)))
        .collect()
}
