//! Weighted-distance merit selection.
//!
//! Given a pool of candidates, the selector greedily extracts a batch of
//! points that are both promising (low surrogate prediction) and far from
//! everything already evaluated, pending, or picked earlier in the batch.
//!
//! # Algorithm overview
//!
//! 1. **Distance field**: `dmerit[i]` is the Euclidean distance from
//!    candidate `i` to its nearest neighbor in `X ∪ Xpend`. With no existing
//!    points every entry is `+∞`.
//! 2. **Predictions**: the surrogate scores every candidate once; scores are
//!    min-max rescaled to `[0, 1]` with [`unit_rescale`].
//! 3. **Greedy picks**: for each weight `w`:
//!    `merit = w * fvals + (1 - w) * (1 - unit_rescale(dmerit))`.
//!    Candidates already picked or closer than `dtol` to any known point are
//!    ineligible. The eligible candidate with the lowest merit is picked
//!    (first in pool order on ties) and `dmerit` is lowered by the distances
//!    to the new pick. If nothing is eligible the weight is skipped.
//!
//! The batch may therefore be shorter than the weight schedule. That is not
//! an error: it means the pool is exhausted at the given tolerance.
//!
//! # Example
//!
//! ```
//! use recas::merit::{ExistingPoints, MeritSelector};
//! use recas::weights::WeightSchedule;
//!
//! let evaluated = vec![vec![0.5, 0.5]];
//! let candidates = vec![vec![0.5, 0.5], vec![0.9, 0.9], vec![0.6, 0.5]];
//! let flat = |_: &[f64]| 0.0;
//!
//! let selector = MeritSelector::new(1e-3).unwrap();
//! let batch = selector
//!     .select(
//!         &flat,
//!         &candidates,
//!         ExistingPoints::new(&evaluated),
//!         &WeightSchedule::new(vec![0.5]).unwrap(),
//!     )
//!     .unwrap();
//!
//! // Flat predictions: the farthest candidate wins.
//! assert_eq!(batch, vec![vec![0.9, 0.9]]);
//! ```

use crate::error::{Error, Result};
use crate::surrogate::Surrogate;
use crate::weights::WeightSchedule;

/// Default minimum distance between a new point and any known point.
pub const DEFAULT_DTOL: f64 = 1e-3;

/// The points a new batch must keep away from: evaluated and pending.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExistingPoints<'a> {
    evaluated: &'a [Vec<f64>],
    pending: &'a [Vec<f64>],
}

impl<'a> ExistingPoints<'a> {
    /// Wraps the evaluated set with no pending points.
    #[must_use]
    pub fn new(evaluated: &'a [Vec<f64>]) -> Self {
        Self {
            evaluated,
            pending: &[],
        }
    }

    /// Adds the points that are dispatched but not yet evaluated.
    #[must_use]
    pub fn with_pending(mut self, pending: &'a [Vec<f64>]) -> Self {
        self.pending = pending;
        self
    }

    /// Previously evaluated points.
    #[must_use]
    pub fn evaluated(&self) -> &'a [Vec<f64>] {
        self.evaluated
    }

    /// Points pending evaluation.
    #[must_use]
    pub fn pending(&self) -> &'a [Vec<f64>] {
        self.pending
    }

    /// Returns `true` when there is nothing to keep away from.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluated.is_empty() && self.pending.is_empty()
    }

    /// Iterates evaluated points, then pending points.
    pub fn iter(&self) -> impl Iterator<Item = &'a [f64]> + use<'a> {
        self.evaluated
            .iter()
            .chain(self.pending.iter())
            .map(Vec::as_slice)
    }
}

/// Min-max rescale to `[0, 1]`: `(x - min) / (max - min)`.
///
/// When every entry is equal (including the empty and all-infinite cases)
/// the result is all ones.
///
/// # Examples
///
/// ```
/// use recas::merit::unit_rescale;
///
/// assert_eq!(unit_rescale(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
/// assert_eq!(unit_rescale(&[7.0, 7.0]), vec![1.0, 1.0]);
/// ```
#[must_use]
#[allow(clippy::float_cmp)]
pub fn unit_rescale(x: &[f64]) -> Vec<f64> {
    let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if x_max == x_min || x.is_empty() {
        return vec![1.0; x.len()];
    }
    let range = x_max - x_min;
    x.iter().map(|&v| (v - x_min) / range).collect()
}

/// Euclidean distance between two points of equal length.
#[must_use]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Distance from each candidate to its nearest existing point.
///
/// Returns `+∞` for every candidate when `existing` is empty, so the
/// distance term never excludes anything on the first iteration.
#[must_use]
pub fn min_distances(candidates: &[Vec<f64>], existing: ExistingPoints<'_>) -> Vec<f64> {
    candidates
        .iter()
        .map(|c| {
            existing
                .iter()
                .map(|p| euclidean_distance(c, p))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Greedy weighted-distance batch selector.
///
/// # Examples
///
/// ```
/// use recas::merit::MeritSelector;
///
/// let selector = MeritSelector::new(1e-2).unwrap();
/// assert_eq!(selector.dtol(), 1e-2);
/// assert!(MeritSelector::new(-1.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeritSelector {
    dtol: f64,
}

impl MeritSelector {
    /// Creates a selector with minimum distance tolerance `dtol`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTolerance`] if `dtol` is negative or not finite.
    pub fn new(dtol: f64) -> Result<Self> {
        if !dtol.is_finite() || dtol < 0.0 {
            return Err(Error::InvalidTolerance(dtol));
        }
        Ok(Self { dtol })
    }

    /// The minimum distance tolerance.
    #[must_use]
    pub fn dtol(&self) -> f64 {
        self.dtol
    }

    /// Selects up to `weights.len()` points from `candidates`.
    ///
    /// Returned points are copies, in selection order. Fewer points than
    /// weights are returned when every remaining candidate lies within
    /// `dtol` of an existing, pending, or already-selected point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] when candidates or existing
    /// points disagree on their length, and
    /// [`Error::PredictionLengthMismatch`] or [`Error::NonFinitePrediction`]
    /// when the surrogate breaks its contract.
    pub fn select<S: Surrogate + ?Sized>(
        &self,
        surrogate: &S,
        candidates: &[Vec<f64>],
        existing: ExistingPoints<'_>,
        weights: &WeightSchedule,
    ) -> Result<Vec<Vec<f64>>> {
        let Some(first) = candidates.first() else {
            return Ok(Vec::new());
        };
        let dim = first.len();
        check_lengths(candidates, dim)?;
        check_lengths(existing.evaluated(), dim)?;
        check_lengths(existing.pending(), dim)?;

        let n = candidates.len();
        let mut dmerit = min_distances(candidates, existing);

        let predictions = surrogate.predict(candidates);
        if predictions.len() != n {
            return Err(Error::PredictionLengthMismatch {
                expected: n,
                got: predictions.len(),
            });
        }
        if let Some(index) = predictions.iter().position(|p| !p.is_finite()) {
            return Err(Error::NonFinitePrediction { index });
        }
        let fvals = unit_rescale(&predictions);

        let mut selected = vec![false; n];
        let mut batch = Vec::with_capacity(weights.len());

        for w in weights.iter() {
            // Rescale the current field, not the initial one.
            let dscaled = unit_rescale(&dmerit);
            let best = (0..n)
                .filter(|&i| !selected[i] && dmerit[i] >= self.dtol)
                .map(|i| (i, w * fvals[i] + (1.0 - w) * (1.0 - dscaled[i])))
                .fold(None, |best: Option<(usize, f64)>, (i, merit)| match best {
                    Some((_, best_merit)) if best_merit <= merit => best,
                    _ => Some((i, merit)),
                });

            let Some((jj, _)) = best else {
                trace_debug!(weight = w, "no eligible candidate left; weight skipped");
                continue;
            };

            selected[jj] = true;
            let pick = &candidates[jj];
            for (d, c) in dmerit.iter_mut().zip(candidates) {
                *d = d.min(euclidean_distance(c, pick));
            }
            batch.push(pick.clone());
        }

        trace_debug!(
            requested = weights.len(),
            selected = batch.len(),
            pool = n,
            "merit selection finished"
        );
        Ok(batch)
    }
}

impl Default for MeritSelector {
    fn default() -> Self {
        Self { dtol: DEFAULT_DTOL }
    }
}

/// Selects a batch from `candidates`, one point per weight at most.
///
/// Shorthand for [`MeritSelector::new`] followed by [`MeritSelector::select`].
///
/// # Errors
///
/// See [`MeritSelector::new`] and [`MeritSelector::select`].
pub fn weighted_distance_merit<S: Surrogate + ?Sized>(
    surrogate: &S,
    candidates: &[Vec<f64>],
    existing: ExistingPoints<'_>,
    weights: &WeightSchedule,
    dtol: f64,
) -> Result<Vec<Vec<f64>>> {
    MeritSelector::new(dtol)?.select(surrogate, candidates, existing, weights)
}

pub(crate) fn check_lengths(points: &[Vec<f64>], dim: usize) -> Result<()> {
    match points.iter().position(|p| p.len() != dim) {
        Some(point_index) => Err(Error::DimensionMismatch {
            expected: dim,
            got: points[point_index].len(),
            point_index,
        }),
        None => Ok(()),
    }
}
