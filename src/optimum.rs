#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::space::Point;

/// The outcome of an optimization run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Optimum {
    /// The best point found.
    pub params: Point,
    /// The objective value at `params`.
    pub value: f64,
    /// The number of evaluated points, seed points included.
    pub evaluations: usize,
    /// The best value seen after each evaluation, in order. Never increases.
    pub best_history: Vec<f64>,
}
