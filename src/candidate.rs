//! Evaluated points and the store that accumulates them over a run.

use core::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::space::Point;

/// A point together with its objective value and its current density weight.
///
/// `value` is fixed once the objective has been evaluated. `weight` is
/// reassigned every iteration by the weighting step and carries no meaning
/// before the first assignment.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// Coordinates of the evaluated point.
    pub parameters: Point,
    /// Objective value at `parameters`.
    pub value: f64,
    /// Kernel weight used by the density estimators.
    pub weight: f64,
}

impl Candidate {
    /// Creates an unweighted candidate.
    #[must_use]
    pub fn new(parameters: Point, value: f64) -> Self {
        Self {
            parameters,
            value,
            weight: 0.0,
        }
    }

    /// Creates a candidate with an explicit weight.
    #[must_use]
    pub fn with_weight(parameters: Point, value: f64, weight: f64) -> Self {
        Self {
            parameters,
            value,
            weight,
        }
    }

    /// Returns `true` if `value` beats `other` for minimization. NaN never wins.
    fn improves_on(&self, other: &Candidate) -> bool {
        self.value < other.value || (other.value.is_nan() && !self.value.is_nan())
    }
}

/// Ascending order by value with NaN placed last.
pub(crate) fn by_value(a: &Candidate, b: &Candidate) -> Ordering {
    a.value
        .partial_cmp(&b.value)
        .unwrap_or_else(|| a.value.is_nan().cmp(&b.value.is_nan()))
}

/// The evaluated points of a run, in insertion or value order.
///
/// The dataset only grows. Re-sorting reorders it but never changes a
/// candidate's value, and the best candidate is tracked separately so it
/// cannot regress when the order changes.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    candidates: Vec<Candidate>,
    best: Option<Candidate>,
}

impl Dataset {
    /// Creates an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dataset with room for `capacity` candidates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(capacity),
            best: None,
        }
    }

    /// Appends a candidate and updates the best-so-far record.
    ///
    /// Returns `true` if the candidate became the new best.
    pub fn append(&mut self, candidate: Candidate) -> bool {
        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| candidate.improves_on(best));
        if improved {
            self.best = Some(candidate.clone());
        }
        self.candidates.push(candidate);
        improved
    }

    /// Sorts the candidates by value, lowest first. Ties keep insertion order.
    pub fn sort_ascending_by_value(&mut self) {
        self.candidates.sort_by(by_value);
    }

    /// Returns the number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns `true` if no candidate has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Returns the lowest-value candidate ever appended.
    #[must_use]
    pub fn best_so_far(&self) -> Option<&Candidate> {
        self.best.as_ref()
    }

    /// Returns the candidates in their current order.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub(crate) fn candidates_mut(&mut self) -> &mut [Candidate] {
        &mut self.candidates
    }
}
