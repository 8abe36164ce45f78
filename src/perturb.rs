use crate::chart::{ActionFrequencyRecord, ActionKey};
use crate::random::{RandomSource, index_below};

/// Every altered frequency moves at least this many percentage points.
pub const MIN_DIFFERENCE: f64 = 15.0;

/// Upper bound on the number of keys altered per record.
pub const MAX_ALTERED_KEYS: usize = 3;

/// Draws attempted per key before falling back to `v ± MIN_DIFFERENCE`.
pub const MAX_DRAWS: usize = 64;

/// Returns a copy of `canonical` with one to three keys moved far enough from
/// their true value to be spotted by a careful player.
///
/// Exactly `min(n, keys)` keys change, where `n` is drawn uniformly from `1..=3`.
/// An empty record is returned unchanged.
pub fn perturb<S: RandomSource + ?Sized>(canonical: &ActionFrequencyRecord, rng: &mut S) -> ActionFrequencyRecord {
    let mut perturbed = canonical.clone();
    if canonical.is_empty() {
        return perturbed;
    }

    let wanted = rng.int_in(1, MAX_ALTERED_KEYS as i64 + 1) as usize;
    for key in choose_keys(canonical, wanted, rng) {
        let original = canonical.value(key);
        perturbed.replace(key, altered_value(original, rng));
    }
    perturbed
}

/// Picks `min(count, len)` distinct keys uniformly without replacement.
fn choose_keys<S: RandomSource + ?Sized>(
    record: &ActionFrequencyRecord,
    count: usize,
    rng: &mut S,
) -> Vec<ActionKey> {
    let mut pool: Vec<ActionKey> = record.keys().collect();
    let count = count.min(pool.len());
    for slot in 0..count {
        let pick = slot + index_below(rng, pool.len() - slot);
        pool.swap(slot, pick);
    }
    pool.truncate(count);
    pool
}

/// Draws a replacement for `original` at least [`MIN_DIFFERENCE`] away from it.
pub fn altered_value<S: RandomSource + ?Sized>(original: f64, rng: &mut S) -> f64 {
    for _ in 0..MAX_DRAWS {
        let candidate = if original < 5.0 {
            rng.int_in(20, 70) as f64
        } else if original > 95.0 {
            rng.int_in(10, 60) as f64
        } else {
            let delta = rng.int_in(-30, 31) as f64;
            (original + delta).clamp(0.0, 100.0)
        };
        if (candidate - original).abs() >= MIN_DIFFERENCE {
            return candidate;
        }
    }

    tracing::debug!(original, "perturbation draws exhausted, using fallback");
    fallback_value(original)
}

fn fallback_value(original: f64) -> f64 {
    if original + MIN_DIFFERENCE <= 100.0 {
        original + MIN_DIFFERENCE
    } else {
        original - MIN_DIFFERENCE
    }
}
