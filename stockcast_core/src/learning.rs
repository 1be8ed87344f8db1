//! Online weight update.

use std::collections::BTreeSet;

use crate::engine::EngineConfig;
use crate::store::FrequencyTable;

/// Bump every distinct observed key by `learn_increment`.
///
/// An unseen key enters at the floor before the bump, so a key observed once
/// ends at `min_weight + learn_increment`. Afterwards every weight in the
/// table is clamped back up to the floor. Returns the number of distinct
/// keys applied.
pub fn apply_observations<I, S>(
    table: &mut FrequencyTable,
    observed: I,
    config: &EngineConfig,
) -> usize
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let distinct: BTreeSet<String> = observed
        .into_iter()
        .map(|key| key.as_ref().to_string())
        .filter(|key| !key.is_empty())
        .collect();

    for key in &distinct {
        let current = table.get(key).map_or(config.min_weight, |w| config.floor(w));
        table.insert(key.clone(), current + config.learn_increment);
    }

    // Only matters when sub-floor weights were injected from outside.
    for weight in table.weights_mut() {
        *weight = config.floor(*weight);
    }

    distinct.len()
}
