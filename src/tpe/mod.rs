//! Tree-structured Parzen Estimator.
//!
//! Each iteration of [`TpeOptimizer`] runs the same pipeline over the
//! evaluated dataset:
//!
//! 1. [`Partitioner`] sorts the dataset and splits off the good group, sized
//!    by a [`SplitStrategy`] ([`SqrtSplit`] by default, [`FixedSplit`] when a
//!    fixed fraction is configured).
//! 2. A [`Weighting`] ([`ImprovementWeighting`] by default) assigns kernel
//!    weights to both groups and returns the prior coefficient `w0`.
//! 3. [`Acquisition`] combines weighted density estimates of both groups with
//!    the [`NonInformativePrior`] and picks the best of a batch of uniform
//!    draws.
//! 4. The objective is evaluated there and the dynamic [`Bandwidth`] is
//!    refreshed for the grown dataset.
//!
//! [`optimize`] runs the whole thing with default settings.

mod acquisition;
mod bandwidth;
mod optimizer;
mod prior;
mod split;
mod weighting;

pub use acquisition::{Acquisition, Proposal};
pub use bandwidth::Bandwidth;
pub use optimizer::{TpeOptimizer, TpeOptimizerBuilder, optimize};
pub use prior::NonInformativePrior;
pub use split::{FixedSplit, Partitioner, SplitStrategy, SqrtSplit};
pub use weighting::{ImprovementWeighting, Weighting};
