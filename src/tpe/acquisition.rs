use crate::candidate::Candidate;
use crate::error::{Error, Result};
use crate::kde::WeightedKde;
use crate::space::{Point, SearchSpace};
use crate::tpe::prior::NonInformativePrior;

/// The TPE acquisition function for one iteration.
///
/// ```text
/// a(x) = (l(x) + w0 * p(x)) / (g(x) + w0 * p(x))
/// ```
///
/// where `l` and `g` are the weighted densities of the good and bad groups and
/// `p` is the non-informative prior. An empty bad group contributes zero
/// density, leaving the prior alone in the denominator.
#[derive(Clone, Copy, Debug)]
pub struct Acquisition<'a> {
    good: WeightedKde<'a>,
    bad: Option<WeightedKde<'a>>,
    prior: &'a NonInformativePrior,
    w0: f64,
}

/// The point chosen by [`Acquisition::maximize`] and its score.
#[derive(Clone, Debug, PartialEq)]
pub struct Proposal {
    /// The sampled point with the highest acquisition score.
    pub point: Point,
    /// Its acquisition score.
    pub score: f64,
}

impl<'a> Acquisition<'a> {
    /// Builds the acquisition function from weighted groups.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyGroup` if `good` is empty, and any error from
    /// building the density estimators.
    pub fn new(
        good: &'a [Candidate],
        bad: &'a [Candidate],
        bandwidth: &'a [f64],
        prior: &'a NonInformativePrior,
        w0: f64,
    ) -> Result<Self> {
        let good = WeightedKde::new(good, bandwidth)?;
        let bad = if bad.is_empty() {
            None
        } else {
            Some(WeightedKde::new(bad, bandwidth)?)
        };
        Ok(Self {
            good,
            bad,
            prior,
            w0,
        })
    }

    /// Returns the acquisition score at `x`.
    ///
    /// A zero denominator yields `+inf` when the numerator is positive and
    /// `0` otherwise.
    #[must_use]
    pub fn score(&self, x: &[f64]) -> f64 {
        let prior = self.w0 * self.prior.density(x);
        let numerator = self.good.pdf(x) + prior;
        let denominator = self.bad.as_ref().map_or(0.0, |kde| kde.pdf(x)) + prior;
        if denominator > 0.0 {
            numerator / denominator
        } else if numerator > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Draws `n_samples` uniform points from `space` and returns the one with
    /// the highest score. Ties go to the earliest draw.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` if `n_samples` is zero.
    pub fn maximize(
        &self,
        space: &SearchSpace,
        rng: &mut fastrand::Rng,
        n_samples: usize,
    ) -> Result<Proposal> {
        let mut best: Option<Proposal> = None;
        for _ in 0..n_samples {
            let point = space.sample(rng);
            let score = self.score(&point);
            let better = best
                .as_ref()
                .is_none_or(|b| score > b.score || (b.score.is_nan() && !score.is_nan()));
            if better {
                best = Some(Proposal { point, score });
            }
        }
        best.ok_or_else(|| {
            Error::config("acquisition_samples", "at least one sample is required")
        })
    }
}
