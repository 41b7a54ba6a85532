#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Black-box minimization of scalar functions over box-constrained continuous
//! spaces with a Tree-structured Parzen Estimator (TPE).
//!
//! The objective is any function from a point to an `f64` (or an error). The
//! optimizer spends a few evaluations on uniform random draws, then models
//! which regions produced low values and which produced high ones, and keeps
//! evaluating where the ratio of the two densities is highest.
//!
//! # Getting Started
//!
//! ```
//! use quickopt::prelude::*;
//!
//! let optimizer = TpeOptimizer::builder(vec![0.0, -5.0], vec![10.0, 5.0])
//!     .iterations(60)
//!     .verbose(false)
//!     .rng_seed(7)
//!     .build()
//!     .unwrap();
//!
//! let optimum = optimizer
//!     .optimize(|x: &[f64]| Ok::<_, Error>((x[0] - 7.0).powi(2) + x[1].powi(2)))
//!     .unwrap();
//!
//! println!("x = {:?}, f(x) = {:.4}", optimum.params, optimum.value);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`TpeOptimizer`](tpe::TpeOptimizer) | Configured via [`TpeOptimizerBuilder`](tpe::TpeOptimizerBuilder); runs the seeding and adaptive phases. |
//! | [`Objective`] | The function being minimized. Closures implement it; structs can also stop a run early. |
//! | [`SearchSpace`] | Per-dimension `[min, max]` bounds; every evaluated point lies inside them. |
//! | [`Dataset`] / [`Candidate`] | The evaluated points of a run and the best one so far. |
//! | [`WeightedKde`] | Weighted Gaussian kernel density estimate over one group of candidates. |
//! | [`Optimum`] | What a run returns: best point, its value, evaluation count, and best-value history. |
//! | [`RandomSearch`] | Uniform sampling baseline with the same calling convention. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on [`SearchSpace`], [`Candidate`], and [`Optimum`] | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at run start, on each iteration, and on new best values | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod candidate;
mod error;
mod kde;
pub mod objective;
mod optimum;
mod random_search;
mod space;
pub mod tpe;

pub use candidate::{Candidate, Dataset};
pub use error::{Error, Result};
pub use kde::WeightedKde;
pub use objective::{Objective, Progress};
pub use optimum::Optimum;
pub use random_search::RandomSearch;
pub use space::{Point, SearchSpace};
pub use tpe::optimize;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use quickopt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::candidate::{Candidate, Dataset};
    pub use crate::error::{Error, Result};
    pub use crate::objective::{Objective, Progress};
    pub use crate::optimum::Optimum;
    pub use crate::random_search::RandomSearch;
    pub use crate::space::{Point, SearchSpace};
    pub use crate::tpe::{
        FixedSplit, ImprovementWeighting, SplitStrategy, SqrtSplit, TpeOptimizer,
        TpeOptimizerBuilder, Weighting, optimize,
    };
}
