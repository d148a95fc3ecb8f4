use std::sync::Arc;

use parking_lot::Mutex;

use crate::candidate::{CandidateGenerator, DycorsConfig};
use crate::error::{Error, Result};
use crate::problem::{OptimizationProblem, validate_problem};
use crate::weights::{DEFAULT_WEIGHT_PATTERN, WeightSchedule};

use super::{DycorsSession, IncumbentMerit, SessionState};

/// Default total number of evaluations.
const DEFAULT_MAX_EVALS: usize = 300;
/// Default number of points per batch.
const DEFAULT_BATCH_SIZE: usize = 5;
/// Default algorithm name in result file names.
const DEFAULT_ALGORITHM_NAME: &str = "RECAS";

/// A builder for constructing [`DycorsSession`] instances with a fluent API.
///
/// Created via [`DycorsSession::builder()`].
///
/// # Defaults
///
/// - `max_evals`: 300
/// - `init_evals`: `11 * dim - 1`
/// - `batch_size`: 5
/// - `weight_pattern`: `[0.3, 0.5, 0.8, 0.95]`, cycled across batches
/// - `sampling_radius`: 0.2
/// - `dtol`: 1e-3
/// - `subset`: all coordinates
/// - `incumbent_merit`: the first objective
/// - `algorithm_name`: `"RECAS"`
/// - `seed`: random
///
/// # Examples
///
/// ```
/// use recas::prelude::*;
///
/// let problem = BoxProblem::new(vec![0.0; 3], vec![1.0; 3])
///     .unwrap()
///     .with_n_objectives(2);
///
/// let session = DycorsSession::builder(problem)
///     .max_evals(100)
///     .batch_size(4)
///     .weight_pattern(vec![0.5, 0.9])
///     .incumbent_merit(|f: &[f64]| f[0] + f[1])
///     .seed(42)
///     .build()
///     .unwrap();
///
/// assert_eq!(session.budget().init_evals, 32);
/// ```
pub struct DycorsSessionBuilder<P> {
    problem: P,
    max_evals: Option<usize>,
    init_evals: Option<usize>,
    batch_size: Option<usize>,
    weight_pattern: Option<Vec<f64>>,
    sampling_radius: Option<f64>,
    dtol: Option<f64>,
    subset: Option<Vec<usize>>,
    incumbent_merit: Option<IncumbentMerit>,
    algorithm_name: Option<String>,
    seed: Option<u64>,
}

impl<P: OptimizationProblem> DycorsSessionBuilder<P> {
    pub(super) fn new(problem: P) -> Self {
        Self {
            problem,
            max_evals: None,
            init_evals: None,
            batch_size: None,
            weight_pattern: None,
            sampling_radius: None,
            dtol: None,
            subset: None,
            incumbent_merit: None,
            algorithm_name: None,
            seed: None,
        }
    }

    /// Sets the total evaluation budget, initial design included.
    ///
    /// Default: 300.
    #[must_use]
    pub fn max_evals(mut self, n: usize) -> Self {
        self.max_evals = Some(n);
        self
    }

    /// Sets the size of the initial design.
    ///
    /// Default: `11 * dim - 1`.
    #[must_use]
    pub fn init_evals(mut self, n: usize) -> Self {
        self.init_evals = Some(n);
        self
    }

    /// Sets the number of points proposed per [`ask`](DycorsSession::ask).
    ///
    /// Default: 5.
    #[must_use]
    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = Some(n);
        self
    }

    /// Sets the weight pattern cycled across batches.
    ///
    /// Default: `[0.3, 0.5, 0.8, 0.95]`.
    #[must_use]
    pub fn weight_pattern(mut self, pattern: Vec<f64>) -> Self {
        self.weight_pattern = Some(pattern);
        self
    }

    /// Sets the perturbation radius as a fraction of each coordinate's range.
    ///
    /// Default: 0.2.
    #[must_use]
    pub fn sampling_radius(mut self, radius: f64) -> Self {
        self.sampling_radius = Some(radius);
        self
    }

    /// Sets the minimum distance tolerance.
    ///
    /// Default: 1e-3.
    #[must_use]
    pub fn dtol(mut self, dtol: f64) -> Self {
        self.dtol = Some(dtol);
        self
    }

    /// Restricts perturbation to the given coordinates.
    ///
    /// Default: all coordinates.
    #[must_use]
    pub fn subset(mut self, subset: Vec<usize>) -> Self {
        self.subset = Some(subset);
        self
    }

    /// Sets how an objective vector is scalarized to pick the incumbent.
    ///
    /// Default: the first objective.
    #[must_use]
    pub fn incumbent_merit(
        mut self,
        merit: impl Fn(&[f64]) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.incumbent_merit = Some(Arc::new(merit));
        self
    }

    /// Sets the algorithm name used in result file names.
    ///
    /// Default: `"RECAS"`.
    #[must_use]
    pub fn algorithm_name(mut self, name: impl Into<String>) -> Self {
        self.algorithm_name = Some(name.into());
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the configured [`DycorsSession`].
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid problem, an inconsistent budget
    /// (`max_evals <= init_evals`), or invalid generator settings or weights.
    pub fn build(self) -> Result<DycorsSession<P>> {
        validate_problem(&self.problem)?;
        let dim = self.problem.dim();

        let init_evals = self.init_evals.unwrap_or(11 * dim - 1);
        let max_evals = self.max_evals.unwrap_or(DEFAULT_MAX_EVALS);
        if max_evals <= init_evals {
            return Err(Error::InvalidBudget {
                init_evals,
                max_evals,
                evals: init_evals,
            });
        }

        let mut config = DycorsConfig::builder();
        if let Some(radius) = self.sampling_radius {
            config = config.sampling_radius(radius);
        }
        if let Some(dtol) = self.dtol {
            config = config.dtol(dtol);
        }
        if let Some(subset) = self.subset {
            config = config.subset(subset);
        }
        let generator = CandidateGenerator::new(config.build()?);

        let weight_pattern = WeightSchedule::new(
            self.weight_pattern
                .unwrap_or_else(|| DEFAULT_WEIGHT_PATTERN.to_vec()),
        )?;

        let incumbent_merit: IncumbentMerit = match self.incumbent_merit {
            Some(merit) => merit,
            None => Arc::new(first_objective),
        };

        trace_info!(dim, init_evals, max_evals, "session created");

        Ok(DycorsSession {
            problem: self.problem,
            generator,
            init_evals,
            max_evals,
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            weight_pattern,
            incumbent_merit,
            algorithm_name: self
                .algorithm_name
                .unwrap_or_else(|| DEFAULT_ALGORITHM_NAME.to_string()),
            state: Mutex::new(SessionState::new(self.seed)),
        })
    }
}

/// Default incumbent merit. An empty objective vector never wins.
fn first_objective(f: &[f64]) -> f64 {
    f.first().copied().unwrap_or(f64::NAN)
}
