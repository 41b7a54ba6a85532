//! Box-constrained search spaces and uniform sampling within them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point in the search space: one coordinate per dimension.
pub type Point = Vec<f64>;

/// Per-dimension lower and upper bounds.
///
/// A `SearchSpace` always has at least one dimension and `min[i] < max[i]`
/// for every dimension; both are checked once, in [`SearchSpace::new`].
///
/// # Examples
///
/// ```
/// use quickopt::SearchSpace;
///
/// let space = SearchSpace::new(vec![0.0, -1.0], vec![10.0, 1.0]).unwrap();
/// assert_eq!(space.dims(), 2);
///
/// let mut rng = fastrand::Rng::with_seed(7);
/// let x = space.sample(&mut rng);
/// assert!(space.contains(&x));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Bounds", into = "Bounds"))]
pub struct SearchSpace {
    min: Point,
    max: Point,
}

/// Unvalidated wire form of a [`SearchSpace`].
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct Bounds {
    min: Point,
    max: Point,
}

#[cfg(feature = "serde")]
impl TryFrom<Bounds> for SearchSpace {
    type Error = Error;

    fn try_from(bounds: Bounds) -> Result<Self> {
        SearchSpace::new(bounds.min, bounds.max)
    }
}

#[cfg(feature = "serde")]
impl From<SearchSpace> for Bounds {
    fn from(space: SearchSpace) -> Self {
        Bounds {
            min: space.min,
            max: space.max,
        }
    }
}

impl SearchSpace {
    /// Creates a search space from its lower and upper bounds.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if the bounds are empty, have
    /// different lengths, contain non-finite values, or if any
    /// `min[i] >= max[i]`.
    pub fn new(min: Point, max: Point) -> Result<Self> {
        if min.is_empty() {
            return Err(Error::config(
                "space",
                "search space needs at least one dimension",
            ));
        }
        if min.len() != max.len() {
            return Err(Error::config(
                "space",
                format!(
                    "lower bounds have {} dimensions but upper bounds have {}",
                    min.len(),
                    max.len()
                ),
            ));
        }
        for (i, (&lo, &hi)) in min.iter().zip(&max).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(Error::config(
                    "space",
                    format!("bounds of dimension {i} must be finite"),
                ));
            }
            if lo >= hi {
                return Err(Error::config(
                    "space",
                    format!("dimension {i}: lower bound {lo} must be below upper bound {hi}"),
                ));
            }
        }
        Ok(Self { min, max })
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.min.len()
    }

    /// Returns the lower bounds.
    #[must_use]
    pub fn min(&self) -> &[f64] {
        &self.min
    }

    /// Returns the upper bounds.
    #[must_use]
    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Returns `max[dim] - min[dim]`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= self.dims()`.
    #[must_use]
    pub fn width(&self, dim: usize) -> f64 {
        self.max[dim] - self.min[dim]
    }

    /// Returns the center of dimension `dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= self.dims()`.
    #[must_use]
    pub fn midpoint(&self, dim: usize) -> f64 {
        0.5 * (self.min[dim] + self.max[dim])
    }

    /// Returns `true` if `x` has the right dimensionality and lies inside the
    /// closed box `[min, max]`.
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.dims()
            && x
                .iter()
                .zip(self.min.iter().zip(&self.max))
                .all(|(&v, (&lo, &hi))| lo <= v && v <= hi)
    }

    /// Draws each coordinate independently and uniformly from `[min[i], max[i])`.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Point {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(&lo, &hi)| uniform(rng, lo, hi))
            .collect()
    }
}

/// Generate a random `f64` in the range `[low, high)`.
#[inline]
fn uniform(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_space_valid() {
        let space = SearchSpace::new(vec![0.0, -5.0], vec![1.0, 5.0]).unwrap();
        assert_eq!(space.dims(), 2);
        assert!((space.width(1) - 10.0).abs() < f64::EPSILON);
        assert!(space.midpoint(1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_search_space_empty() {
        let result = SearchSpace::new(vec![], vec![]);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_search_space_length_mismatch() {
        let result = SearchSpace::new(vec![0.0, 0.0], vec![1.0]);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_search_space_inverted_bounds() {
        assert!(SearchSpace::new(vec![1.0], vec![0.0]).is_err());
        // Equal bounds are rejected as well
        assert!(SearchSpace::new(vec![0.0, 2.0], vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_search_space_non_finite() {
        assert!(SearchSpace::new(vec![f64::NEG_INFINITY], vec![0.0]).is_err());
        assert!(SearchSpace::new(vec![0.0], vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_sample_within_bounds() {
        let space = SearchSpace::new(vec![-3.0, 10.0, 0.0], vec![3.0, 11.0, 1e-3]).unwrap();
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..1000 {
            let x = space.sample(&mut rng);
            assert_eq!(x.len(), 3);
            for (i, &v) in x.iter().enumerate() {
                assert!(v >= space.min()[i] && v < space.max()[i], "{v} out of range");
            }
        }
    }

    #[test]
    fn test_sample_deterministic_with_seeded_rng() {
        let space = SearchSpace::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        let mut rng1 = fastrand::Rng::with_seed(42);
        let mut rng2 = fastrand::Rng::with_seed(42);
        for _ in 0..10 {
            assert_eq!(space.sample(&mut rng1), space.sample(&mut rng2));
        }
    }

    #[test]
    fn test_contains() {
        let space = SearchSpace::new(vec![0.0], vec![1.0]).unwrap();
        assert!(space.contains(&[0.0]));
        assert!(space.contains(&[1.0]));
        assert!(!space.contains(&[1.5]));
        assert!(!space.contains(&[0.5, 0.5]));
    }
}
