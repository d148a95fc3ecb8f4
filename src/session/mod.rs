//! Ask/tell session driving DYCORS rounds.
//!
//! A [`DycorsSession`] keeps the evaluated points, their objective vectors
//! and the points still out for evaluation. Each [`ask`](DycorsSession::ask)
//! runs one round of candidate generation and merit selection around the
//! current incumbent; each [`tell`](DycorsSession::tell) records a finished
//! evaluation. Fitting the surrogate and running the objective stay with the
//! caller, so the session works equally well from a single loop or from
//! several worker threads sharing it by reference.
//!
//! # Example
//!
//! ```
//! use recas::prelude::*;
//!
//! let problem = BoxProblem::new(vec![-2.0; 2], vec![2.0; 2]).unwrap();
//! let session = DycorsSession::builder(problem)
//!     .init_evals(4)
//!     .max_evals(12)
//!     .batch_size(2)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! // Initial design, evaluated elsewhere.
//! for x in [[-1.0, -1.0], [1.0, 1.0], [-1.0, 1.0], [1.0, -1.0]] {
//!     let f = x[0] * x[0] + x[1] * x[1];
//!     session.tell(x.to_vec(), vec![f]).unwrap();
//! }
//!
//! let surrogate = |x: &[f64]| x[0] * x[0] + x[1] * x[1];
//! let batch = session.ask(&surrogate).unwrap();
//! assert_eq!(batch.len(), 2);
//! assert_eq!(session.pending().len(), 2);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::candidate::{Budget, CandidateGenerator};
use crate::error::{Error, Result};
use crate::merit::{ExistingPoints, MeritSelector};
use crate::problem::OptimizationProblem;
use crate::surrogate::Surrogate;
use crate::weights::WeightSchedule;

mod builder;
mod export;
#[cfg(feature = "serde")]
mod persistence;

pub use builder::DycorsSessionBuilder;
pub use export::{result_file_name, write_results};
#[cfg(feature = "serde")]
pub use persistence::SessionSnapshot;

/// One completed evaluation: a point and its objective vector.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    /// The evaluated point.
    pub x: Vec<f64>,
    /// The objective values at `x`.
    pub objectives: Vec<f64>,
}

/// Scalarizes an objective vector for incumbent selection. Lower is better.
pub type IncumbentMerit = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Mutable state behind the `Mutex`.
struct SessionState {
    rng: fastrand::Rng,
    points: Vec<Vec<f64>>,
    objectives: Vec<Vec<f64>>,
    pending: Vec<Vec<f64>>,
    /// Position in the cyclic weight pattern for the next batch.
    weight_offset: usize,
    /// Budget reserved by asks whose selection is still running.
    in_flight: usize,
}

impl SessionState {
    fn new(seed: Option<u64>) -> Self {
        Self {
            rng: seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed),
            points: Vec::new(),
            objectives: Vec::new(),
            pending: Vec::new(),
            weight_offset: 0,
            in_flight: 0,
        }
    }

    fn evaluations(&self) -> Vec<Evaluation> {
        self.points
            .iter()
            .zip(&self.objectives)
            .map(|(x, f)| Evaluation {
                x: x.clone(),
                objectives: f.clone(),
            })
            .collect()
    }
}

/// An ask/tell optimization session over a box-constrained problem.
///
/// Created via [`DycorsSession::builder`]. All methods take `&self`; state
/// lives behind a [`parking_lot::Mutex`].
pub struct DycorsSession<P> {
    problem: P,
    generator: CandidateGenerator,
    init_evals: usize,
    max_evals: usize,
    batch_size: usize,
    weight_pattern: WeightSchedule,
    incumbent_merit: IncumbentMerit,
    algorithm_name: String,
    state: Mutex<SessionState>,
}

impl<P: OptimizationProblem> DycorsSession<P> {
    /// Returns a [`DycorsSessionBuilder`] for the given problem.
    #[must_use]
    pub fn builder(problem: P) -> DycorsSessionBuilder<P> {
        DycorsSessionBuilder::new(problem)
    }

    /// Proposes the next batch of points to evaluate.
    ///
    /// The incumbent is the completed evaluation with the lowest incumbent
    /// merit. The batch takes the next `batch_size` weights from the cyclic
    /// pattern, never exceeds the remaining budget, and is recorded as
    /// pending. It may be shorter (even empty) when the candidate pool is
    /// exhausted.
    ///
    /// The session lock is released while `surrogate` scores the pool, so
    /// the surrogate may read the session. Batches asked concurrently do not
    /// see each other's points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoCompletedEvaluations`] before the first
    /// [`tell`](Self::tell), and propagates generator and selector errors.
    pub fn ask<S: Surrogate + ?Sized>(&self, surrogate: &S) -> Result<Vec<Vec<f64>>> {
        let (pool, points, pending, weights) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            let best = incumbent_index(&state.objectives, self.incumbent_merit.as_ref())
                .ok_or(Error::NoCompletedEvaluations)?;

            let evals = state.points.len();
            let remaining = self
                .max_evals
                .saturating_sub(evals + state.pending.len() + state.in_flight);
            let n = self.batch_size.min(remaining);
            if n == 0 {
                trace_debug!(evals, pending = state.pending.len(), "budget exhausted; nothing to ask");
                return Ok(Vec::new());
            }

            let budget = Budget::new(self.init_evals, self.max_evals, evals.max(self.init_evals))?;
            let weights =
                WeightSchedule::cyclic(self.weight_pattern.as_slice(), state.weight_offset, n)?;
            let pool = self.generator.generate_pool(
                &self.problem,
                &state.points[best],
                budget,
                &mut state.rng,
            )?;

            state.weight_offset += weights.len();
            state.in_flight += weights.len();
            (pool, state.points.clone(), state.pending.clone(), weights)
        };

        let selected = MeritSelector::new(self.generator.config().dtol()).and_then(|selector| {
            selector.select(
                surrogate,
                &pool,
                ExistingPoints::new(&points).with_pending(&pending),
                &weights,
            )
        });

        let mut state = self.state.lock();
        state.in_flight -= weights.len();
        let batch = selected?;
        state.pending.extend(batch.iter().cloned());

        if batch.len() < weights.len() {
            trace_info!(
                requested = weights.len(),
                selected = batch.len(),
                "candidate pool exhausted at the distance tolerance"
            );
        }
        trace_info!(evals = points.len(), batch = batch.len(), "asked for new batch");
        Ok(batch)
    }

    /// Records a finished evaluation.
    ///
    /// If `x` is pending it stops being pending. Points from an external
    /// initial design can be told directly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`], [`Error::PointOutOfBounds`] or
    /// [`Error::ObjectiveDimensionMismatch`] on malformed input.
    pub fn tell(&self, x: Vec<f64>, objectives: Vec<f64>) -> Result<()> {
        self.check_point(&x)?;
        let n_obj = self.problem.n_objectives();
        if objectives.len() != n_obj {
            return Err(Error::ObjectiveDimensionMismatch {
                expected: n_obj,
                got: objectives.len(),
            });
        }

        let mut state = self.state.lock();
        if let Some(pos) = state.pending.iter().position(|p| *p == x) {
            state.pending.swap_remove(pos);
        }
        state.points.push(x);
        state.objectives.push(objectives);
        trace_debug!(evals = state.points.len(), "evaluation recorded");
        Ok(())
    }

    /// Marks a point as dispatched for evaluation without going through
    /// [`ask`](Self::ask), e.g. an initial-design point still running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `x` has the wrong length and
    /// [`Error::PointOutOfBounds`] if it lies outside the box.
    pub fn mark_pending(&self, x: Vec<f64>) -> Result<()> {
        self.check_point(&x)?;
        self.state.lock().pending.push(x);
        Ok(())
    }

    /// Drops a pending point whose evaluation was abandoned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPendingPoint`] if `x` is not pending.
    pub fn cancel(&self, x: &[f64]) -> Result<()> {
        let mut state = self.state.lock();
        let pos = state
            .pending
            .iter()
            .position(|p| p.as_slice() == x)
            .ok_or(Error::UnknownPendingPoint)?;
        state.pending.swap_remove(pos);
        Ok(())
    }

    /// Runs ask/evaluate/tell rounds until the budget is spent.
    ///
    /// Before each round `fit` builds a surrogate from all evaluations so
    /// far; `evaluate` returns the objective vector of one point. The loop
    /// also stops when a round yields no points.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ask`](Self::ask) and [`tell`](Self::tell).
    ///
    /// # Examples
    ///
    /// ```
    /// use recas::prelude::*;
    ///
    /// let problem = BoxProblem::new(vec![0.0; 2], vec![1.0; 2]).unwrap();
    /// let session = DycorsSession::builder(problem)
    ///     .init_evals(3)
    ///     .max_evals(15)
    ///     .batch_size(3)
    ///     .seed(1)
    ///     .build()
    ///     .unwrap();
    ///
    /// let objective = |x: &[f64]| vec![(x[0] - 0.3).powi(2) + (x[1] - 0.6).powi(2)];
    /// for x in [[0.1, 0.1], [0.5, 0.9], [0.9, 0.4]] {
    ///     session.tell(x.to_vec(), objective(&x)).unwrap();
    /// }
    ///
    /// session
    ///     .optimize(
    ///         |_history: &[Evaluation]| |x: &[f64]| (x[0] - 0.3).powi(2) + (x[1] - 0.6).powi(2),
    ///         objective,
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(session.n_evaluations(), 15);
    /// assert!(session.best().unwrap().objectives[0] < 0.13);
    /// ```
    pub fn optimize<S, F, E>(&self, mut fit: F, mut evaluate: E) -> Result<()>
    where
        S: Surrogate,
        F: FnMut(&[Evaluation]) -> S,
        E: FnMut(&[f64]) -> Vec<f64>,
    {
        while !self.is_finished() {
            let surrogate = fit(&self.evaluations());
            let batch = self.ask(&surrogate)?;
            if batch.is_empty() {
                trace_info!(evals = self.n_evaluations(), "no new points; stopping");
                break;
            }
            for x in batch {
                let f = evaluate(&x);
                self.tell(x, f)?;
            }
        }
        trace_info!(evals = self.n_evaluations(), "optimization finished");
        Ok(())
    }

    /// The completed evaluations, in the order they were told.
    #[must_use]
    pub fn evaluations(&self) -> Vec<Evaluation> {
        self.state.lock().evaluations()
    }

    /// Points dispatched but not yet told.
    #[must_use]
    pub fn pending(&self) -> Vec<Vec<f64>> {
        self.state.lock().pending.clone()
    }

    /// Number of completed evaluations.
    #[must_use]
    pub fn n_evaluations(&self) -> usize {
        self.state.lock().points.len()
    }

    /// The current incumbent: the evaluation with the lowest incumbent merit.
    #[must_use]
    pub fn best(&self) -> Option<Evaluation> {
        let state = self.state.lock();
        let i = incumbent_index(&state.objectives, self.incumbent_merit.as_ref())?;
        Some(Evaluation {
            x: state.points[i].clone(),
            objectives: state.objectives[i].clone(),
        })
    }

    /// Returns `true` once `max_evals` evaluations have completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.n_evaluations() >= self.max_evals
    }

    /// The evaluation counters as the generator sees them.
    #[must_use]
    pub fn budget(&self) -> Budget {
        let evals = self.n_evaluations();
        Budget {
            init_evals: self.init_evals,
            max_evals: self.max_evals,
            evals: evals.max(self.init_evals),
        }
    }

    /// The problem descriptor.
    #[must_use]
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// The name written into result file names.
    #[must_use]
    pub fn algorithm_name(&self) -> &str {
        &self.algorithm_name
    }

    fn check_point(&self, x: &[f64]) -> Result<()> {
        let dim = self.problem.dim();
        if x.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                got: x.len(),
                point_index: 0,
            });
        }
        let (lb, ub) = (self.problem.lower_bounds(), self.problem.upper_bounds());
        for (index, ((&value, &low), &high)) in x.iter().zip(lb).zip(ub).enumerate() {
            if !(low..=high).contains(&value) {
                return Err(Error::PointOutOfBounds { index, value });
            }
        }
        Ok(())
    }
}

/// Index of the evaluation with the lowest merit, first on ties.
/// NaN merits never win.
fn incumbent_index(
    objectives: &[Vec<f64>],
    merit: &(dyn Fn(&[f64]) -> f64 + Send + Sync),
) -> Option<usize> {
    objectives
        .iter()
        .map(|f| merit(f.as_slice()))
        .enumerate()
        .filter(|(_, m)| !m.is_nan())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}
