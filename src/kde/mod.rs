//! Kernel density estimation over groups of weighted candidates.
//!
//! The TPE driver builds one estimator for the good group and one for the bad
//! group each iteration, then compares them through the acquisition function.

mod weighted;

pub use weighted::WeightedKde;
