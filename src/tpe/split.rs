use core::fmt::Debug;

use crate::candidate::{Candidate, Dataset};
use crate::error::{Error, Result};

/// A strategy for choosing what fraction of the dataset counts as "good".
///
/// The partitioner multiplies the returned fraction by the dataset size,
/// floors it, and clamps the result to `[2, group_cap]` (and to the dataset
/// size), so implementations only need to express the schedule.
///
/// # Examples
///
/// ```
/// use quickopt::tpe::SplitStrategy;
///
/// #[derive(Debug, Clone)]
/// struct Quarter;
///
/// impl SplitStrategy for Quarter {
///     fn fraction(&self, _n: usize) -> f64 {
///         0.25
///     }
///
///     fn clone_box(&self) -> Box<dyn SplitStrategy> {
///         Box::new(self.clone())
///     }
/// }
/// ```
pub trait SplitStrategy: Send + Sync + Debug {
    /// Returns the good-group fraction for a dataset of `n` candidates.
    fn fraction(&self, n: usize) -> f64;

    /// Creates a boxed clone of this strategy.
    fn clone_box(&self) -> Box<dyn SplitStrategy>;
}

impl Clone for Box<dyn SplitStrategy> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// The default schedule: `threshold / sqrt(n)`.
///
/// The good group grows like `threshold * sqrt(n)`, so it becomes a
/// shrinking share of an ever larger dataset.
///
/// # Examples
///
/// ```
/// use quickopt::tpe::{SplitStrategy, SqrtSplit};
///
/// let split = SqrtSplit::new(0.5).unwrap();
/// assert!((split.fraction(25) - 0.1).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SqrtSplit {
    threshold: f64,
}

impl SqrtSplit {
    /// Creates a square-root schedule.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if `threshold` is not a positive
    /// finite number.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(Error::config(
                "threshold",
                format!("{threshold} must be positive"),
            ));
        }
        Ok(Self { threshold })
    }

    /// Returns the threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for SqrtSplit {
    /// Creates the schedule with `threshold = 0.5`.
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl SplitStrategy for SqrtSplit {
    #[allow(clippy::cast_precision_loss)]
    fn fraction(&self, n: usize) -> f64 {
        if n == 0 {
            return 1.0;
        }
        self.threshold / (n as f64).sqrt()
    }

    fn clone_box(&self) -> Box<dyn SplitStrategy> {
        Box::new(*self)
    }
}

/// A constant good-group fraction, independent of dataset size.
#[derive(Debug, Clone, Copy)]
pub struct FixedSplit {
    fraction: f64,
}

impl FixedSplit {
    /// Creates a fixed split.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if `fraction` is not in `[0, 1]`.
    pub fn new(fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::config(
                "split",
                format!("{fraction} must be within [0, 1]"),
            ));
        }
        Ok(Self { fraction })
    }

    /// Returns the fixed fraction.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.fraction
    }
}

impl SplitStrategy for FixedSplit {
    fn fraction(&self, _n: usize) -> f64 {
        self.fraction
    }

    fn clone_box(&self) -> Box<dyn SplitStrategy> {
        Box::new(*self)
    }
}

/// Splits a dataset into a good group and a bad group.
///
/// The good group is the `good_size(n)` lowest-value candidates; the bad group
/// is everything else. Both are views into the dataset after it has been
/// sorted, so weights written through them land on the dataset itself.
#[derive(Debug, Clone)]
pub struct Partitioner {
    strategy: Box<dyn SplitStrategy>,
    group_cap: usize,
}

/// Smallest good group the weighting step can work with.
const MIN_GOOD: usize = 2;

impl Partitioner {
    /// Creates a partitioner.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if `group_cap < 2`.
    pub fn new(strategy: Box<dyn SplitStrategy>, group_cap: usize) -> Result<Self> {
        if group_cap < MIN_GOOD {
            return Err(Error::config(
                "group_cap",
                format!("{group_cap} must be at least {MIN_GOOD}"),
            ));
        }
        Ok(Self {
            strategy,
            group_cap,
        })
    }

    /// Returns the split strategy.
    #[must_use]
    pub fn strategy(&self) -> &dyn SplitStrategy {
        self.strategy.as_ref()
    }

    /// Returns the good-group ceiling.
    #[must_use]
    pub fn group_cap(&self) -> usize {
        self.group_cap
    }

    /// Returns the good-group size for a dataset of `n` candidates:
    /// `clamp(floor(n * fraction(n)), 2, group_cap)`, never more than `n`.
    ///
    /// A dataset with fewer than two candidates yields a good group of that
    /// size, which the weighting step then rejects as degenerate.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn good_size(&self, n: usize) -> usize {
        // Float-to-int casts saturate: NaN and negatives become 0
        let raw = (n as f64 * self.strategy.fraction(n)).floor() as usize;
        raw.clamp(MIN_GOOD, self.group_cap).min(n)
    }

    /// Sorts `dataset` by value and splits it into `(good, bad)`.
    pub fn split<'a>(&self, dataset: &'a mut Dataset) -> (&'a mut [Candidate], &'a mut [Candidate]) {
        dataset.sort_ascending_by_value();
        let n_good = self.good_size(dataset.len());
        dataset.candidates_mut().split_at_mut(n_good)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn dataset_of(values: &[f64]) -> Dataset {
        let mut dataset = Dataset::new();
        for (i, &v) in values.iter().enumerate() {
            dataset.append(Candidate::new(vec![i as f64], v));
        }
        dataset
    }

    #[test]
    fn test_sqrt_split_default() {
        let split = SqrtSplit::default();
        assert!((split.threshold() - 0.5).abs() < f64::EPSILON);
        assert!((split.fraction(4) - 0.25).abs() < f64::EPSILON);
        assert!((split.fraction(0) - 1.0).abs() < f64::EPSILON);
        assert!(split.fraction(10) > split.fraction(100));
    }

    #[test]
    fn test_sqrt_split_invalid() {
        assert!(SqrtSplit::new(0.0).is_err());
        assert!(SqrtSplit::new(-1.0).is_err());
        assert!(SqrtSplit::new(f64::NAN).is_err());
        assert!(SqrtSplit::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_fixed_split() {
        let split = FixedSplit::new(0.3).unwrap();
        assert!((split.fraction(10) - 0.3).abs() < f64::EPSILON);
        assert!((split.fraction(1000) - 0.3).abs() < f64::EPSILON);
        assert!(FixedSplit::new(0.0).is_ok());
        assert!(FixedSplit::new(1.0).is_ok());
        assert!(FixedSplit::new(-0.1).is_err());
        assert!(FixedSplit::new(1.1).is_err());
        assert!(FixedSplit::new(f64::NAN).is_err());
    }

    #[test]
    fn test_split_strategy_clone_box() {
        let boxed: Box<dyn SplitStrategy> = Box::new(FixedSplit::new(0.4).unwrap());
        let cloned = boxed.clone();
        assert!((cloned.fraction(7) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partitioner_rejects_small_cap() {
        let result = Partitioner::new(Box::new(SqrtSplit::default()), 1);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_good_size_floor_and_clamp() {
        let p = Partitioner::new(Box::new(FixedSplit::new(0.5).unwrap()), 9999).unwrap();
        assert_eq!(p.good_size(10), 5);
        assert_eq!(p.good_size(11), 5);
        // floor(3 * 0.5) = 1 is raised to the minimum of 2
        assert_eq!(p.good_size(3), 2);
        // ... but never beyond the dataset
        assert_eq!(p.good_size(1), 1);
        assert_eq!(p.good_size(0), 0);
    }

    #[test]
    fn test_good_size_respects_cap() {
        let p = Partitioner::new(Box::new(FixedSplit::new(1.0).unwrap()), 4).unwrap();
        assert_eq!(p.good_size(100), 4);
        assert_eq!(p.good_size(3), 3);
    }

    #[test]
    fn test_good_size_with_zero_fraction() {
        let p = Partitioner::new(Box::new(FixedSplit::new(0.0).unwrap()), 9999).unwrap();
        assert_eq!(p.good_size(50), 2);
    }

    #[test]
    fn test_good_size_default_schedule() {
        let p = Partitioner::new(Box::new(SqrtSplit::new(2.0).unwrap()), 9999).unwrap();
        // 2 / sqrt(16) * 16 = 8
        assert_eq!(p.good_size(16), 8);
        // 2 / sqrt(100) * 100 = 20
        assert_eq!(p.good_size(100), 20);
    }

    #[test]
    fn test_split_selects_lowest_values() {
        let mut dataset = dataset_of(&[5.0, 1.0, 4.0, 2.0, 3.0, 0.0]);
        let p = Partitioner::new(Box::new(FixedSplit::new(0.5).unwrap()), 9999).unwrap();
        let (good, bad) = p.split(&mut dataset);

        let good_values: Vec<f64> = good.iter().map(|c| c.value).collect();
        let bad_values: Vec<f64> = bad.iter().map(|c| c.value).collect();
        assert_eq!(good_values, vec![0.0, 1.0, 2.0]);
        assert_eq!(bad_values, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_split_sizes_are_exhaustive() {
        let p = Partitioner::new(Box::new(SqrtSplit::new(1.0).unwrap()), 6).unwrap();
        for n in 2..200 {
            #[allow(clippy::cast_precision_loss)]
            let values: Vec<f64> = (0..n).map(|i| ((i * 37) % 101) as f64).collect();
            let mut dataset = dataset_of(&values);
            let (good, bad) = p.split(&mut dataset);
            assert_eq!(good.len() + bad.len(), n);
            assert!(good.len() >= 2 && good.len() <= n.min(6));
        }
    }

    #[test]
    fn test_split_allows_empty_bad_group() {
        let mut dataset = dataset_of(&[1.0, 2.0]);
        let p = Partitioner::new(Box::new(SqrtSplit::default()), 9999).unwrap();
        let (good, bad) = p.split(&mut dataset);
        assert_eq!(good.len(), 2);
        assert!(bad.is_empty());
    }
}
