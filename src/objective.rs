//! The [`Objective`] trait defines what gets minimized.
//!
//! Closures taking a point and returning `Result<f64, E>` implement it
//! directly:
//!
//! ```
//! use quickopt::prelude::*;
//!
//! let optimizer = TpeOptimizer::builder(vec![-10.0], vec![10.0])
//!     .iterations(30)
//!     .verbose(false)
//!     .rng_seed(3)
//!     .build()
//!     .unwrap();
//!
//! let optimum = optimizer
//!     .optimize(|x: &[f64]| Ok::<_, Error>((x[0] - 3.0).powi(2)))
//!     .unwrap();
//! assert!(optimum.value < 100.0);
//! ```
//!
//! Implement the trait on a struct to stop a run early through
//! [`before_iteration`](Objective::before_iteration):
//!
//! ```
//! use std::ops::ControlFlow;
//!
//! use quickopt::prelude::*;
//!
//! struct StopBelow {
//!     target: f64,
//! }
//!
//! impl Objective for StopBelow {
//!     type Error = Error;
//!
//!     fn evaluate(&mut self, x: &[f64]) -> Result<f64> {
//!         Ok(x.iter().map(|v| v * v).sum())
//!     }
//!
//!     fn before_iteration(&mut self, progress: &Progress) -> ControlFlow<()> {
//!         if progress.best_value < self.target {
//!             ControlFlow::Break(())
//!         } else {
//!             ControlFlow::Continue(())
//!         }
//!     }
//! }
//!
//! let optimizer = TpeOptimizer::builder(vec![-5.0, -5.0], vec![5.0, 5.0])
//!     .iterations(200)
//!     .verbose(false)
//!     .rng_seed(11)
//!     .build()
//!     .unwrap();
//! let optimum = optimizer.optimize(StopBelow { target: 1.0 }).unwrap();
//! assert!(optimum.value < 1.0 || optimum.evaluations == 209);
//! ```

use core::ops::ControlFlow;

/// A black-box scalar function to minimize.
///
/// The optimizer makes no assumption about cost, purity, or reentrancy: each
/// call happens on the caller's thread, one at a time, and an error is handed
/// back to the caller exactly as returned.
pub trait Objective {
    /// The error type returned by [`evaluate`](Objective::evaluate).
    type Error;

    /// Evaluates the objective at `x`.
    ///
    /// # Errors
    ///
    /// Any error of the objective's choosing; it aborts the run and is
    /// returned from `optimize` unchanged.
    fn evaluate(&mut self, x: &[f64]) -> Result<f64, Self::Error>;

    /// Called before each adaptive iteration.
    ///
    /// Return `ControlFlow::Break(())` to stop the run and keep the best point
    /// found so far.
    ///
    /// Default: always continues.
    fn before_iteration(&mut self, _progress: &Progress) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl<F, E> Objective for F
where
    F: FnMut(&[f64]) -> Result<f64, E>,
{
    type Error = E;

    fn evaluate(&mut self, x: &[f64]) -> Result<f64, E> {
        self(x)
    }
}

/// A snapshot of a run, handed to [`Objective::before_iteration`].
#[derive(Clone, Debug, PartialEq)]
pub struct Progress {
    /// The iteration about to run, starting at 1.
    pub iteration: usize,
    /// The number of objective evaluations recorded so far (seed points included).
    pub evaluations: usize,
    /// The lowest objective value seen so far.
    pub best_value: f64,
    /// The value of the most recent evaluation.
    pub last_value: f64,
}
