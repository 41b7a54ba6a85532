//! Uniform random search.

use core::ops::ControlFlow;

use parking_lot::Mutex;

use crate::candidate::{Candidate, Dataset};
use crate::error::{Error, Result};
use crate::objective::{Objective, Progress};
use crate::optimum::Optimum;
use crate::space::{Point, SearchSpace};

/// Evaluates the objective at uniformly drawn points and keeps the best.
///
/// It ignores everything it has seen so far, which makes it the baseline any
/// model-based optimizer should beat.
///
/// # Examples
///
/// ```
/// use quickopt::{Error, RandomSearch};
///
/// let search = RandomSearch::new(vec![-1.0], vec![1.0], 50)
///     .unwrap()
///     .with_seed(42);
/// let optimum = search
///     .optimize(|x: &[f64]| Ok::<_, Error>(x[0].abs()))
///     .unwrap();
/// assert_eq!(optimum.evaluations, 50);
/// ```
#[derive(Debug)]
pub struct RandomSearch {
    space: SearchSpace,
    evaluations: usize,
    rng: Mutex<fastrand::Rng>,
}

impl RandomSearch {
    /// Creates a random search with `evaluations` objective calls per run.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if the bounds are invalid or
    /// `evaluations` is zero.
    pub fn new(space_min: Point, space_max: Point, evaluations: usize) -> Result<Self> {
        if evaluations == 0 {
            return Err(Error::config("evaluations", "must be positive"));
        }
        Ok(Self {
            space: SearchSpace::new(space_min, space_max)?,
            evaluations,
            rng: Mutex::new(fastrand::Rng::new()),
        })
    }

    /// Reseeds the random generator for reproducible runs.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
            ..self
        }
    }

    /// Returns the search space.
    #[must_use]
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Minimizes `objective` by uniform sampling.
    ///
    /// [`Objective::before_iteration`] is consulted before every evaluation
    /// after the first.
    ///
    /// # Errors
    ///
    /// Returns the objective's own error unchanged if an evaluation fails.
    pub fn optimize<O>(&self, mut objective: O) -> core::result::Result<Optimum, O::Error>
    where
        O: Objective,
        O::Error: From<Error>,
    {
        let mut rng = self.rng.lock().fork();
        let mut dataset = Dataset::with_capacity(self.evaluations);
        let mut best_history = Vec::with_capacity(self.evaluations);
        let mut last_value = f64::NAN;

        for iteration in 0..self.evaluations {
            if iteration > 0 {
                let progress = Progress {
                    iteration,
                    evaluations: dataset.len(),
                    best_value: dataset.best_so_far().map_or(f64::NAN, |c| c.value),
                    last_value,
                };
                if let ControlFlow::Break(()) = objective.before_iteration(&progress) {
                    trace_info!(iteration, "random search stopped by objective");
                    break;
                }
            }

            let x = self.space.sample(&mut rng);
            last_value = objective.evaluate(&x)?;
            if dataset.append(Candidate::new(x, last_value)) {
                trace_debug!(iteration, value = last_value, "new best value found");
            }
            best_history.push(dataset.best_so_far().map_or(f64::NAN, |c| c.value));
        }

        let best = dataset.best_so_far().ok_or(Error::EmptyGroup)?;
        Ok(Optimum {
            params: best.parameters.clone(),
            value: best.value,
            evaluations: dataset.len(),
            best_history,
        })
    }
}
