//! Weighted, axis-aligned Gaussian kernel density estimation.

use crate::candidate::Candidate;
use crate::error::{Error, Result};

/// A weighted Gaussian kernel density estimate over a group of candidates.
///
/// Each member contributes a product of univariate Gaussian kernels centered
/// at its parameters, one per dimension, scaled by the member's weight:
///
/// `f(x) = (1/n) * Σ_c w_c * Π_j N(x_j; c_j, h_j)`
///
/// The bandwidth matrix is diagonal, so dimensions are smoothed independently.
/// The estimator borrows the group and the bandwidths; it is rebuilt every
/// iteration and never outlives the dataset snapshot it was built from.
///
/// Member weights are expected to be non-negative. With unit weights the
/// estimate integrates to one.
///
/// # Examples
///
/// ```
/// use quickopt::{Candidate, WeightedKde};
///
/// let group = vec![
///     Candidate::with_weight(vec![0.0, 0.0], 1.0, 1.0),
///     Candidate::with_weight(vec![1.0, 1.0], 2.0, 1.0),
/// ];
/// let bandwidth = [0.5, 0.5];
/// let kde = WeightedKde::new(&group, &bandwidth).unwrap();
///
/// assert!(kde.pdf(&[0.0, 0.0]) > kde.pdf(&[5.0, 5.0]));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct WeightedKde<'a> {
    members: &'a [Candidate],
    bandwidth: &'a [f64],
}

impl<'a> WeightedKde<'a> {
    /// Creates an estimator over `members` with per-dimension `bandwidth`.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyGroup` if `members` is empty.
    /// Returns `Error::DimensionMismatch` if a member's parameters do not have
    /// one coordinate per bandwidth entry.
    /// Returns `Error::InvalidConfiguration` if a bandwidth entry is not a
    /// positive finite number.
    pub fn new(members: &'a [Candidate], bandwidth: &'a [f64]) -> Result<Self> {
        if members.is_empty() {
            return Err(Error::EmptyGroup);
        }
        if let Some(&bw) = bandwidth.iter().find(|&&bw| !(bw.is_finite() && bw > 0.0)) {
            return Err(Error::config(
                "bandwidth",
                format!("kernel width {bw} must be positive and finite"),
            ));
        }
        if let Some(member) = members
            .iter()
            .find(|c| c.parameters.len() != bandwidth.len())
        {
            return Err(Error::DimensionMismatch {
                expected: bandwidth.len(),
                got: member.parameters.len(),
            });
        }
        debug_assert!(
            members.iter().all(|c| c.weight >= 0.0),
            "kernel weights must be non-negative"
        );

        Ok(Self { members, bandwidth })
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn n_dims(&self) -> usize {
        self.bandwidth.len()
    }

    /// Returns the number of group members.
    #[must_use]
    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    /// Returns the log density at `x`.
    ///
    /// Kernels are combined with the log-sum-exp trick, so points far from
    /// every member yield a finite (very negative) value rather than `ln 0`
    /// as long as some member has a positive weight. Zero-weight members drop
    /// out; if every weight is zero the result is `-inf`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != self.n_dims()`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn log_pdf(&self, x: &[f64]) -> f64 {
        assert_eq!(
            x.len(),
            self.n_dims(),
            "Point dimension {} doesn't match KDE dimension {}",
            x.len(),
            self.n_dims()
        );

        // log K_h(z) = -log(h) - 0.5*log(2*pi) - 0.5*z^2
        let half_log_2pi = 0.5 * (2.0 * core::f64::consts::PI).ln();
        let log_norm: f64 = self
            .bandwidth
            .iter()
            .map(|&h| -h.ln() - half_log_2pi)
            .sum();

        let log_terms: Vec<f64> = self
            .members
            .iter()
            .map(|member| {
                let quad: f64 = x
                    .iter()
                    .zip(&member.parameters)
                    .zip(self.bandwidth)
                    .map(|((&xj, &cj), &hj)| {
                        let z = (xj - cj) / hj;
                        z * z
                    })
                    .sum();
                member.weight.ln() + log_norm - 0.5 * quad
            })
            .collect();

        let max_term = log_terms
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        if max_term.is_infinite() {
            return f64::NEG_INFINITY;
        }

        let sum_exp: f64 = log_terms.iter().map(|&t| (t - max_term).exp()).sum();
        -(self.members.len() as f64).ln() + max_term + sum_exp.ln()
    }

    /// Returns the density at `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != self.n_dims()`.
    #[must_use]
    pub fn pdf(&self, x: &[f64]) -> f64 {
        self.log_pdf(x).exp()
    }
}
