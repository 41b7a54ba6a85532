//! The TPE driver: seeding, iteration, and the builder that configures it.

use core::ops::ControlFlow;

use parking_lot::Mutex;

use crate::candidate::{Candidate, Dataset};
use crate::error::{Error, Result};
use crate::objective::{Objective, Progress};
use crate::optimum::Optimum;
use crate::space::{Point, SearchSpace};
use crate::tpe::acquisition::{Acquisition, Proposal};
use crate::tpe::bandwidth::Bandwidth;
use crate::tpe::prior::NonInformativePrior;
use crate::tpe::split::{FixedSplit, Partitioner, SplitStrategy, SqrtSplit};
use crate::tpe::weighting::{ImprovementWeighting, Weighting};

/// A Tree-structured Parzen Estimator optimizer over a box-constrained space.
///
/// A run first fills its dataset with `samples` evaluated points (caller
/// seed points, then uniform draws). Each following iteration sorts the
/// dataset, splits it into good and bad groups, weights both, fits a kernel
/// density estimate to each, and evaluates the objective at the point that
/// maximizes the density ratio among `acquisition_samples` uniform draws.
///
/// Configuration is validated once by [`TpeOptimizerBuilder::build`]; a built
/// optimizer can run any number of times. Each run forks its own random
/// stream from the optimizer's generator.
///
/// # Examples
///
/// ```
/// use quickopt::tpe::TpeOptimizer;
/// use quickopt::Error;
///
/// let optimizer = TpeOptimizer::builder(vec![0.0], vec![10.0])
///     .iterations(40)
///     .samples(8)
///     .acquisition_samples(64)
///     .verbose(false)
///     .rng_seed(42)
///     .build()
///     .unwrap();
///
/// let optimum = optimizer
///     .optimize(|x: &[f64]| Ok::<_, Error>((x[0] - 7.0).powi(2)))
///     .unwrap();
///
/// assert!((0.0..=10.0).contains(&optimum.params[0]));
/// assert_eq!(optimum.evaluations, 8 + 39);
/// ```
#[derive(Debug)]
pub struct TpeOptimizer {
    space: SearchSpace,
    iterations: usize,
    samples: usize,
    acquisition_samples: usize,
    verbose: bool,
    partitioner: Partitioner,
    weighting: Box<dyn Weighting>,
    bandwidth: Bandwidth,
    prior: NonInformativePrior,
    seed_points: Vec<Candidate>,
    rng: Mutex<fastrand::Rng>,
}

impl TpeOptimizer {
    /// Creates a builder for the space bounded by `space_min` and `space_max`.
    #[must_use]
    pub fn builder(space_min: Point, space_max: Point) -> TpeOptimizerBuilder {
        TpeOptimizerBuilder::new(space_min, space_max)
    }

    /// Returns the search space.
    #[must_use]
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Returns the total number of rounds, the seeding round included.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns the dataset size reached before adaptive rounds begin.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Returns the partitioner used to split the dataset.
    #[must_use]
    pub fn partitioner(&self) -> &Partitioner {
        &self.partitioner
    }

    /// Returns the bandwidth a run starts with.
    #[must_use]
    pub fn initial_bandwidth(&self) -> &Bandwidth {
        &self.bandwidth
    }

    /// Minimizes `objective` over the search space.
    ///
    /// The objective is called `samples - seed_points` times while seeding and
    /// once per adaptive iteration, `iterations - 1` iterations in all unless
    /// [`Objective::before_iteration`] stops the run early.
    ///
    /// # Errors
    ///
    /// Returns the objective's own error unchanged if an evaluation fails.
    /// Returns `Error::DegenerateGroup` or `Error::EmptyGroup` (converted into
    /// the objective's error type) if the density model collapses.
    pub fn optimize<O>(&self, mut objective: O) -> core::result::Result<Optimum, O::Error>
    where
        O: Objective,
        O::Error: From<Error>,
    {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!(
            "tpe",
            dims = self.space.dims(),
            iterations = self.iterations,
            samples = self.samples
        )
        .entered();
        trace_info!(
            seed_points = self.seed_points.len(),
            acquisition_samples = self.acquisition_samples,
            "run started"
        );

        let mut rng = self.rng.lock().fork();
        let mut run = Run::new(self);

        run.seed(&mut objective, &mut rng)?;
        trace_info!(evaluations = run.dataset.len(), "seeding complete");

        for iteration in 1..self.iterations {
            let progress = run.progress(iteration);
            if let ControlFlow::Break(()) = objective.before_iteration(&progress) {
                trace_info!(iteration, "run stopped by objective");
                break;
            }
            run.step(iteration, &mut objective, &mut rng)?;
        }

        let optimum = run.finish()?;
        trace_info!(value = optimum.value, evaluations = optimum.evaluations, "run complete");
        Ok(optimum)
    }
}

/// Minimizes `objective` over `[space_min, space_max]` with default settings.
///
/// Equivalent to `TpeOptimizer::builder(space_min, space_max).build()?.optimize(objective)`.
///
/// # Errors
///
/// Returns `Error::InvalidConfiguration` for invalid bounds, and otherwise the
/// same errors as [`TpeOptimizer::optimize`].
pub fn optimize<O>(
    objective: O,
    space_min: Point,
    space_max: Point,
) -> core::result::Result<Optimum, O::Error>
where
    O: Objective,
    O::Error: From<Error>,
{
    TpeOptimizer::builder(space_min, space_max)
        .build()?
        .optimize(objective)
}

/// State owned by one call to [`TpeOptimizer::optimize`].
struct Run<'a> {
    optimizer: &'a TpeOptimizer,
    dataset: Dataset,
    bandwidth: Bandwidth,
    best_history: Vec<f64>,
    last_value: f64,
}

impl<'a> Run<'a> {
    fn new(optimizer: &'a TpeOptimizer) -> Self {
        optimizer.weighting.reset();
        let capacity = optimizer.samples + optimizer.iterations.saturating_sub(1);
        Self {
            optimizer,
            dataset: Dataset::with_capacity(capacity),
            bandwidth: optimizer.bandwidth.clone(),
            best_history: Vec::with_capacity(capacity),
            last_value: f64::NAN,
        }
    }

    fn best_value(&self) -> f64 {
        self.dataset.best_so_far().map_or(f64::NAN, |c| c.value)
    }

    /// Appends a candidate; returns `true` if it is the new best.
    fn record(&mut self, candidate: Candidate) -> bool {
        self.last_value = candidate.value;
        let improved = self.dataset.append(candidate);
        self.best_history.push(self.best_value());
        improved
    }

    fn progress(&self, iteration: usize) -> Progress {
        Progress {
            iteration,
            evaluations: self.dataset.len(),
            best_value: self.best_value(),
            last_value: self.last_value,
        }
    }

    fn seed<O>(&mut self, objective: &mut O, rng: &mut fastrand::Rng) -> core::result::Result<(), O::Error>
    where
        O: Objective,
    {
        let opt = self.optimizer;
        for seed in &opt.seed_points {
            self.record(seed.clone());
        }
        for _ in opt.seed_points.len()..opt.samples {
            let x = opt.space.sample(rng);
            let value = objective.evaluate(&x)?;
            self.record(Candidate::new(x, value));
        }
        Ok(())
    }

    /// Splits, weights, and models the dataset, then picks the next point.
    fn propose(&mut self, rng: &mut fastrand::Rng) -> Result<Proposal> {
        let opt = self.optimizer;
        let (good, bad) = opt.partitioner.split(&mut self.dataset);
        let w0 = opt.weighting.assign(good, bad)?;
        trace_debug!(good = good.len(), bad = bad.len(), w0, "groups weighted");

        let acquisition = Acquisition::new(good, bad, self.bandwidth.widths(), &opt.prior, w0)?;
        acquisition.maximize(&opt.space, rng, opt.acquisition_samples)
    }

    fn step<O>(
        &mut self,
        iteration: usize,
        objective: &mut O,
        rng: &mut fastrand::Rng,
    ) -> core::result::Result<(), O::Error>
    where
        O: Objective,
        O::Error: From<Error>,
    {
        let opt = self.optimizer;
        let proposal = self.propose(rng)?;
        #[cfg(feature = "tracing")]
        let score = proposal.score;

        let value = objective.evaluate(&proposal.point)?;
        if self.record(Candidate::new(proposal.point, value)) {
            trace_info!(iteration, value, "new best value found");
        }
        trace_debug!(iteration, value, score, "iteration complete");

        if opt.verbose {
            eprintln!("Iteration {iteration}: {value}");
            eprintln!("Best value: {}", self.best_value());
        }

        self.bandwidth.refresh(&opt.space, self.dataset.len());
        Ok(())
    }

    fn finish(self) -> Result<Optimum> {
        let best = self.dataset.best_so_far().ok_or(Error::EmptyGroup)?;
        Ok(Optimum {
            params: best.parameters.clone(),
            value: best.value,
            evaluations: self.dataset.len(),
            best_history: self.best_history,
        })
    }
}

/// Builder for [`TpeOptimizer`].
///
/// Every setter stores its value as given; all validation happens in
/// [`build`](Self::build), before the objective is ever called.
///
/// # Examples
///
/// ```
/// use quickopt::tpe::TpeOptimizer;
///
/// let optimizer = TpeOptimizer::builder(vec![-1.0, -1.0], vec![1.0, 1.0])
///     .iterations(50)
///     .samples(12)
///     .threshold(1.0)
///     .group_cap(6)
///     .prior_weight(0.5)
///     .seed_points(vec![(vec![0.0, 0.0], 3.5)])
///     .build()
///     .unwrap();
/// assert_eq!(optimizer.samples(), 12);
/// ```
#[derive(Debug, Clone)]
pub struct TpeOptimizerBuilder {
    space_min: Point,
    space_max: Point,
    iterations: usize,
    samples: usize,
    acquisition_samples: usize,
    verbose: bool,
    threshold: f64,
    split: Option<f64>,
    split_strategy: Option<Box<dyn SplitStrategy>>,
    weighting: Option<Box<dyn Weighting>>,
    group_cap: usize,
    bandwidth: Vec<f64>,
    prior_weight: f64,
    seed_points: Vec<(Point, f64)>,
    rng_seed: Option<u64>,
}

impl TpeOptimizerBuilder {
    /// Creates a builder with default settings:
    ///
    /// - `iterations`: 100
    /// - `samples`: 10
    /// - `acquisition_samples`: 100
    /// - `verbose`: true
    /// - `threshold`: 0.5 (good fraction `threshold / sqrt(n)`)
    /// - `split`: none
    /// - `group_cap`: 9999
    /// - `bandwidth`: empty (dynamic)
    /// - `prior_weight`: 1.0
    /// - `seed_points`: none
    /// - `rng_seed`: none (OS entropy)
    #[must_use]
    pub fn new(space_min: Point, space_max: Point) -> Self {
        Self {
            space_min,
            space_max,
            iterations: 100,
            samples: 10,
            acquisition_samples: 100,
            verbose: true,
            threshold: 0.5,
            split: None,
            split_strategy: None,
            weighting: None,
            group_cap: 9999,
            bandwidth: Vec::new(),
            prior_weight: 1.0,
            seed_points: Vec::new(),
            rng_seed: None,
        }
    }

    /// Sets the total number of rounds. The first round is the seeding round,
    /// so `iterations - 1` adaptive evaluations follow it.
    #[must_use]
    pub fn iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    /// Sets the dataset size reached before adaptive rounds begin.
    #[must_use]
    pub fn samples(mut self, n: usize) -> Self {
        self.samples = n;
        self
    }

    /// Sets how many uniform draws compete for the next evaluation.
    #[must_use]
    pub fn acquisition_samples(mut self, n: usize) -> Self {
        self.acquisition_samples = n;
        self
    }

    /// Enables or disables per-iteration progress lines on stderr.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the threshold of the default `threshold / sqrt(n)` split schedule.
    ///
    /// Must be in `(0, sqrt(samples)]`; checked by `build()` even when a fixed
    /// split overrides the schedule.
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Uses a fixed good fraction in `[0, 1]` instead of the schedule.
    #[must_use]
    pub fn split(mut self, fraction: f64) -> Self {
        self.split = Some(fraction);
        self
    }

    /// Uses a custom split strategy. Takes precedence over
    /// [`split`](Self::split) and [`threshold`](Self::threshold), which are
    /// still validated.
    #[must_use]
    pub fn split_strategy<S: SplitStrategy + 'static>(mut self, strategy: S) -> Self {
        self.split_strategy = Some(Box::new(strategy));
        self
    }

    /// Uses a custom weighting instead of [`ImprovementWeighting`].
    #[must_use]
    pub fn weighting<W: Weighting + 'static>(mut self, weighting: W) -> Self {
        self.weighting = Some(Box::new(weighting));
        self
    }

    /// Sets the hard ceiling on the good-group size. Must be at least 2.
    #[must_use]
    pub fn group_cap(mut self, cap: usize) -> Self {
        self.group_cap = cap;
        self
    }

    /// Fixes the per-dimension kernel widths. An empty vector selects the
    /// dynamic schedule.
    #[must_use]
    pub fn bandwidth(mut self, widths: Vec<f64>) -> Self {
        self.bandwidth = widths;
        self
    }

    /// Scales the non-informative prior's contribution.
    #[must_use]
    pub fn prior_weight(mut self, weight: f64) -> Self {
        self.prior_weight = weight;
        self
    }

    /// Supplies pre-evaluated `(point, value)` pairs, used before any random
    /// draw. At most `samples` pairs are accepted.
    #[must_use]
    pub fn seed_points(mut self, points: Vec<(Point, f64)>) -> Self {
        self.seed_points = points;
        self
    }

    /// Seeds the random generator for reproducible runs.
    #[must_use]
    pub fn rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Validates the configuration and builds the optimizer.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if:
    /// - `iterations`, `samples`, or `acquisition_samples` is zero
    /// - `threshold` is not in `(0, sqrt(samples)]`
    /// - `split` is set but not in `[0, 1]`
    /// - `group_cap < 2`
    /// - the bounds differ in length, are empty, or `min[i] >= max[i]`
    /// - `bandwidth` is non-empty but its length differs from the dimension
    ///   count, or an entry is not positive and finite
    /// - `prior_weight` is negative or not finite
    /// - more seed points than `samples` are given, a seed point has the wrong
    ///   dimension or lies outside the bounds, or a seed value is not finite
    #[allow(clippy::cast_precision_loss, clippy::too_many_lines)]
    pub fn build(self) -> Result<TpeOptimizer> {
        for (option, n) in [
            ("iterations", self.iterations),
            ("samples", self.samples),
            ("acquisition_samples", self.acquisition_samples),
        ] {
            if n == 0 {
                return Err(Error::config(option, "must be positive"));
            }
        }

        let max_threshold = (self.samples as f64).sqrt();
        if self.threshold > max_threshold {
            return Err(Error::config(
                "threshold",
                format!(
                    "{} must be at most sqrt(samples) = {max_threshold}",
                    self.threshold
                ),
            ));
        }
        let schedule = SqrtSplit::new(self.threshold)?;

        let fixed = self.split.map(FixedSplit::new).transpose()?;
        let strategy: Box<dyn SplitStrategy> = match (self.split_strategy, fixed) {
            (Some(custom), _) => custom,
            (None, Some(fixed)) => Box::new(fixed),
            (None, None) => Box::new(schedule),
        };
        let partitioner = Partitioner::new(strategy, self.group_cap)?;

        let space = SearchSpace::new(self.space_min, self.space_max)?;
        let dims = space.dims();

        let bandwidth = if self.bandwidth.is_empty() {
            Bandwidth::dynamic(&space, self.samples)
        } else {
            if self.bandwidth.len() != dims {
                return Err(Error::config(
                    "bandwidth",
                    format!(
                        "expected {dims} kernel widths but got {}",
                        self.bandwidth.len()
                    ),
                ));
            }
            if let Some(bw) = self
                .bandwidth
                .iter()
                .find(|&&bw| !(bw.is_finite() && bw > 0.0))
            {
                return Err(Error::config(
                    "bandwidth",
                    format!("kernel width {bw} must be positive and finite"),
                ));
            }
            Bandwidth::fixed(self.bandwidth)
        };

        if !(self.prior_weight.is_finite() && self.prior_weight >= 0.0) {
            return Err(Error::config(
                "prior_weight",
                format!("{} must be non-negative and finite", self.prior_weight),
            ));
        }
        let prior = NonInformativePrior::new(&space, self.prior_weight);

        if self.seed_points.len() > self.samples {
            return Err(Error::config(
                "seed_points",
                format!(
                    "{} seed points exceed samples = {}",
                    self.seed_points.len(),
                    self.samples
                ),
            ));
        }
        let mut seed_points = Vec::with_capacity(self.seed_points.len());
        for (i, (point, value)) in self.seed_points.into_iter().enumerate() {
            if point.len() != dims {
                return Err(Error::config(
                    "seed_points",
                    format!("seed point {i} has {} coordinates, expected {dims}", point.len()),
                ));
            }
            if !space.contains(&point) {
                return Err(Error::config(
                    "seed_points",
                    format!("seed point {i} lies outside the search space"),
                ));
            }
            if !value.is_finite() {
                return Err(Error::config(
                    "seed_points",
                    format!("seed point {i} has non-finite value {value}"),
                ));
            }
            seed_points.push(Candidate::new(point, value));
        }

        let rng = match self.rng_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };

        Ok(TpeOptimizer {
            space,
            iterations: self.iterations,
            samples: self.samples,
            acquisition_samples: self.acquisition_samples,
            verbose: self.verbose,
            partitioner,
            weighting: self
                .weighting
                .unwrap_or_else(|| Box::new(ImprovementWeighting::new())),
            bandwidth,
            prior,
            seed_points,
            rng: Mutex::new(rng),
        })
    }
}
