/// Errors produced while configuring or running an optimizer.
///
/// Configuration problems are reported by
/// [`TpeOptimizerBuilder::build`](crate::tpe::TpeOptimizerBuilder::build)
/// before the objective is ever called. [`Error::DegenerateGroup`] and
/// [`Error::EmptyGroup`] can only surface mid-run, once the statistical model
/// has collapsed; both end the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when an option is outside its valid range.
    #[error("invalid configuration for `{option}`: {reason}")]
    InvalidConfiguration {
        /// The name of the offending option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when the good group cannot be weighted because its
    /// normalization term sums to zero (one member, or all members tied).
    #[error("degenerate good group of size {size}: weighting denominator is zero")]
    DegenerateGroup {
        /// The size of the group that collapsed.
        size: usize,
    },

    /// Returned when a density estimate would average over zero points.
    #[error("kernel density estimate requires at least one member")]
    EmptyGroup,

    /// Returned when a point does not have the dimensionality of the search space.
    #[error("dimension mismatch: expected {expected} coordinates but got {got}")]
    DimensionMismatch {
        /// The dimensionality of the search space.
        expected: usize,
        /// The length of the offending point.
        got: usize,
    },
}

impl Error {
    pub(crate) fn config(option: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            option,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
