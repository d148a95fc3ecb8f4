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

//! Surrogate-assisted candidate generation and batch selection for
//! expensive, many-objective black-box optimization.
//!
//! Each optimization round does two things. A DYCORS generator perturbs
//! the incumbent into a pool of `100 * dim` feasible candidates, perturbing
//! fewer coordinates as the evaluation budget runs out. A weighted-distance
//! selector then picks a small batch from that pool, trading the
//! surrogate's prediction off against distance to everything already
//! evaluated or pending.
//!
//! # Getting Started
//!
//! ```
//! use recas::prelude::*;
//!
//! let problem = BoxProblem::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
//! let evaluated = vec![vec![0.5, 0.5]];
//! let surrogate = |x: &[f64]| (x[0] - 0.2).powi(2) + (x[1] - 0.8).powi(2);
//! let mut rng = fastrand::Rng::with_seed(42);
//!
//! let batch = candidate_dycors(
//!     &problem,
//!     &surrogate,
//!     &evaluated[0],
//!     ExistingPoints::new(&evaluated),
//!     &WeightSchedule::new(vec![0.3, 0.95]).unwrap(),
//!     Budget::new(1, 50, 1).unwrap(),
//!     &DycorsConfig::default(),
//!     &mut rng,
//! )
//! .unwrap();
//!
//! assert_eq!(batch.len(), 2);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`OptimizationProblem`](problem::OptimizationProblem) | Box bounds and integer coordinates of the problem. |
//! | [`Surrogate`](surrogate::Surrogate) | Cheap model predicting a score per candidate, lower is better. |
//! | [`CandidateGenerator`](candidate::CandidateGenerator) | Builds the perturbation pool around the incumbent. |
//! | [`MeritSelector`](merit::MeritSelector) | Greedily picks a diverse, promising batch from the pool. |
//! | [`WeightSchedule`](weights::WeightSchedule) | One prediction-vs-distance weight per point to pick. |
//! | [`DycorsSession`](session::DycorsSession) | Ask/tell loop tracking evaluated and pending points. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on public types, [`DycorsSession::save`](session::DycorsSession::save)/[`restore`](session::DycorsSession::restore) | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at pool generation, selection and session steps | off |

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

pub mod candidate;
mod error;
pub mod merit;
pub mod problem;
mod rng_util;
pub mod session;
pub mod surrogate;
pub mod weights;

pub use candidate::{Budget, CandidateGenerator, DycorsConfig, candidate_dycors};
pub use error::{Error, Result};
pub use merit::{ExistingPoints, MeritSelector, unit_rescale, weighted_distance_merit};
pub use session::{DycorsSession, Evaluation};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use recas::prelude::*;
/// ```
pub mod prelude {
    pub use crate::candidate::{
        Budget, CandidateGenerator, DycorsConfig, candidate_dycors, perturbation_probability,
    };
    pub use crate::error::{Error, Result};
    pub use crate::merit::{
        ExistingPoints, MeritSelector, unit_rescale, weighted_distance_merit,
    };
    pub use crate::problem::{BoxProblem, OptimizationProblem};
    #[cfg(feature = "serde")]
    pub use crate::session::SessionSnapshot;
    pub use crate::session::{DycorsSession, DycorsSessionBuilder, Evaluation};
    pub use crate::surrogate::Surrogate;
    pub use crate::weights::WeightSchedule;
}
