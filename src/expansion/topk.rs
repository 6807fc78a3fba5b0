//! Top-k selection over scored token ids.

use std::cmp::Ordering;

/// Descending by score, ascending by id on ties.
fn rank(a: &(u32, f32), b: &(u32, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Select the `k` highest-scoring `(id, score)` entries.
///
/// Entries scoring NaN or negative infinity are never selected, so masking a
/// score to `f32::NEG_INFINITY` removes the id from contention. The result is
/// sorted by descending score; equal scores are ordered by ascending id.
pub fn top_k_by_score<I>(entries: I, k: usize) -> Vec<(u32, f32)>
where
    I: IntoIterator<Item = (u32, f32)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<(u32, f32)> = entries
        .into_iter()
        .filter(|(_, score)| !score.is_nan() && *score != f32::NEG_INFINITY)
        .collect();

    if candidates.len() > k {
        candidates.select_nth_unstable_by(k - 1, rank);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(rank);
    candidates
}

/// Select the `k` highest-scoring positions of a dense score row.
pub fn top_k_of_row(scores: &[f32], k: usize) -> Vec<(u32, f32)> {
    top_k_by_score(
        scores.iter().enumerate().map(|(id, score)| (id as u32, *score)),
        k,
    )
}
