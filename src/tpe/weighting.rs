use core::fmt::Debug;
use core::hash::{Hash, Hasher};
use std::collections::HashMap;
use std::hash::DefaultHasher;

use parking_lot::Mutex;

use crate::candidate::Candidate;
use crate::error::{Error, Result};

/// Assigns kernel weights to the good and bad groups.
///
/// `assign` writes a weight into every candidate of both groups and returns
/// `w0`, the coefficient the acquisition function puts on the
/// non-informative prior. `good` arrives sorted by value, lowest first.
/// Weights must be non-negative.
pub trait Weighting: Send + Sync + Debug {
    /// Weighs both groups and returns the prior coefficient `w0`.
    ///
    /// # Errors
    ///
    /// Implementations return `Error::DegenerateGroup` when the good group
    /// carries no usable information.
    fn assign(&self, good: &mut [Candidate], bad: &mut [Candidate]) -> Result<f64>;

    /// Called once at the start of every run. Implementations holding per-run
    /// caches drop them here.
    ///
    /// Default: does nothing.
    fn reset(&self) {}

    /// Creates a boxed clone of this weighting.
    fn clone_box(&self) -> Box<dyn Weighting>;
}

impl Clone for Box<dyn Weighting> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Identifies a good group by its size and the exact bit patterns of its values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GroupKey {
    size: usize,
    fingerprint: u64,
}

impl GroupKey {
    fn of(good: &[Candidate]) -> Self {
        let mut hasher = DefaultHasher::new();
        for c in good {
            c.value.to_bits().hash(&mut hasher);
        }
        Self {
            size: good.len(),
            fingerprint: hasher.finish(),
        }
    }
}

/// Expected-improvement weighting.
///
/// With `yq` the highest value in the good group and `n = |good|`:
///
/// ```text
/// denom     = Σ_good (yq - v) / (1 + n)
/// w(good c) = (yq - c.value) / denom
/// w(bad c)  = 1 / (|bad| + 1)
/// w0        = Σ_good denom * w(c) / n
/// ```
///
/// Points further below the boundary value weigh more; the boundary member
/// itself gets weight zero. The normalization term is memoized per group
/// content for the duration of a run; [`reset`](Weighting::reset) empties the
/// memo. Clearing it never changes a result, only which sums get recomputed.
#[derive(Debug, Default)]
pub struct ImprovementWeighting {
    denominators: Mutex<HashMap<GroupKey, f64>>,
}

impl ImprovementWeighting {
    /// Creates a weighting with an empty memo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct good groups memoized so far.
    #[must_use]
    pub fn memoized(&self) -> usize {
        self.denominators.lock().len()
    }

    #[allow(clippy::cast_precision_loss)]
    fn denominator(&self, good: &[Candidate], yq: f64) -> f64 {
        let key = GroupKey::of(good);
        let cached = self.denominators.lock().get(&key).copied();
        if let Some(denom) = cached {
            return denom;
        }

        let scale = 1.0 / (1.0 + good.len() as f64);
        let denom: f64 = good.iter().map(|c| scale * (yq - c.value)).sum();
        self.denominators.lock().insert(key, denom);
        denom
    }
}

impl Clone for ImprovementWeighting {
    fn clone(&self) -> Self {
        Self {
            denominators: Mutex::new(self.denominators.lock().clone()),
        }
    }
}

impl Weighting for ImprovementWeighting {
    #[allow(clippy::cast_precision_loss)]
    fn assign(&self, good: &mut [Candidate], bad: &mut [Candidate]) -> Result<f64> {
        if good.is_empty() {
            return Err(Error::EmptyGroup);
        }

        let yq = good
            .iter()
            .map(|c| c.value)
            .fold(f64::NEG_INFINITY, f64::max);
        let denom = self.denominator(good, yq);
        if !(denom.is_finite() && denom > 0.0) {
            return Err(Error::DegenerateGroup { size: good.len() });
        }

        for c in good.iter_mut() {
            c.weight = (yq - c.value) / denom;
        }

        let bad_weight = 1.0 / (bad.len() as f64 + 1.0);
        for c in bad.iter_mut() {
            c.weight = bad_weight;
        }

        let w0 = good.iter().map(|c| denom * c.weight).sum::<f64>() / good.len() as f64;
        Ok(w0)
    }

    fn reset(&self) {
        self.denominators.lock().clear();
    }

    fn clone_box(&self) -> Box<dyn Weighting> {
        Box::new(self.clone())
    }
}
