use std::collections::HashMap;

use rand::Rng;

/// Builds the (choices, cumulative distribution) pair for one state's
/// transition counts.
///
/// Candidates are sorted by token before the partial sums are computed, so
/// the choice-array order is deterministic across runs and platforms rather
/// than following map iteration order. Selection probabilities depend only
/// on the counts, so this changes nothing statistically.
///
/// # Invariants (given every count >= 1)
/// - `cum_dist` is strictly increasing
/// - `cum_dist.last()` equals the total occurrence count for the state
pub(crate) fn calculate_cum_dist(next: &HashMap<String, usize>) -> (Vec<String>, Vec<usize>) {
	let mut entries: Vec<(&String, usize)> = next.iter().map(|(token, count)| (token, *count)).collect();
	entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

	let mut choices = Vec::with_capacity(entries.len());
	let mut cum_dist = Vec::with_capacity(entries.len());
	let mut total = 0;
	for (token, count) in entries {
		total += count;
		choices.push(token.clone());
		cum_dist.push(total);
	}
	(choices, cum_dist)
}

/// Draws a weighted random index from a cumulative distribution.
///
/// Candidate `i` is selected with probability `count_i / total`, where
/// `total` is the last partial sum.
///
/// # Notes
/// - `cum_dist` must be non-empty with a positive final value; chain lookups
///   guarantee this because states only exist with at least one transition.
pub fn choose_index(cum_dist: &[usize]) -> usize {
	choose_index_with_rng(cum_dist, &mut rand::rng())
}

/// Draws a weighted random index using a caller-supplied RNG.
///
/// Uniform draw `r` in `[0, total)`, then a binary search for the smallest
/// index `i` with `cum_dist[i] > r` — O(log k) per draw.
///
/// This exists primarily for deterministic testing.
pub fn choose_index_with_rng<R: Rng + ?Sized>(cum_dist: &[usize], rng: &mut R) -> usize {
	let total = cum_dist[cum_dist.len() - 1];
	let draw = rng.random_range(0..total);
	cum_dist.partition_point(|&partial| partial <= draw)
}
