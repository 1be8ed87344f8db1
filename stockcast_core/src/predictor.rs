//! Weighted sampling without replacement.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use crate::{Error, Result};

/// Draw up to `count` distinct keys from `candidates`.
///
/// Each step picks one remaining candidate with probability proportional to
/// its weight, then removes it from the pool. Weights below `min_weight`
/// (including NaN) count as `min_weight`, infinite ones as `f64::MAX`.
/// Each step's weights are divided by the largest remaining one, so the
/// total never overflows however large the stored weights grow.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    mut candidates: Vec<(String, f64)>,
    count: usize,
    min_weight: f64,
    rng: &mut R,
) -> Result<Vec<String>> {
    let draws = count.min(candidates.len());
    let mut chosen = Vec::with_capacity(draws);

    for _ in 0..draws {
        let weights: Vec<f64> = candidates
            .iter()
            .map(|(_, w)| w.max(min_weight).min(f64::MAX))
            .collect();
        let largest = weights.iter().copied().fold(0.0, f64::max);
        if largest <= 0.0 || !largest.is_finite() {
            return Err(Error::Sampling(format!(
                "no positive weight among {} candidates",
                weights.len()
            )));
        }
        let dist = WeightedIndex::new(weights.iter().map(|w| w / largest))
            .map_err(|e| Error::Sampling(e.to_string()))?;
        let (key, _) = candidates.remove(dist.sample(rng));
        chosen.push(key);
    }

    Ok(chosen)
}
