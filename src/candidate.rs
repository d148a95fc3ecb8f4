//! DYCORS candidate generation.
//!
//! DYCORS (DYnamic COordinate search using Response Surfaces) builds a
//! large pool of candidates around the incumbent by perturbing a random
//! subset of its coordinates with Gaussian noise. The chance of perturbing
//! any single coordinate decays as the evaluation budget is consumed, so
//! the search moves from broad exploration to local refinement.
//!
//! # Algorithm overview
//!
//! 1. **Scales**: coordinate `i` is perturbed with standard deviation
//!    `sampling_radius * (ub_i - lb_i)`. Integer coordinates that may be
//!    perturbed get a scale of at least 1.0, otherwise rounding would undo
//!    almost every perturbation.
//! 2. **Probability**: see [`perturbation_probability`].
//! 3. **Masks**: each of the `100 * dim` rows flips a coin per eligible
//!    coordinate. Rows where every coin came up tails get one uniformly
//!    chosen coordinate instead. With a single eligible coordinate every row
//!    perturbs it.
//! 4. **Draws**: perturbed coordinates are drawn from
//!    `Normal(xbest_i, scale_i)` and clipped to `[lb_i, ub_i]`; the rest copy
//!    `xbest`.
//! 5. **Integrality**: every integer coordinate of every row is rounded
//!    (ties to even) and clipped to the integers inside its bounds.
//!
//! The pool is then handed to the [`MeritSelector`].
//!
//! # Configuration
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `sampling_radius` | 0.2 | Perturbation std-dev as a fraction of each coordinate's range |
//! | `dtol` | 1e-3 | Minimum distance between a selected point and any known point |
//! | `subset` | all coordinates | Coordinates eligible for perturbation |
//!
//! # Examples
//!
//! ```
//! use recas::candidate::{Budget, CandidateGenerator, DycorsConfig};
//! use recas::merit::ExistingPoints;
//! use recas::problem::BoxProblem;
//! use recas::weights::WeightSchedule;
//!
//! let problem = BoxProblem::new(vec![-5.0; 3], vec![5.0; 3]).unwrap();
//! let generator = CandidateGenerator::new(
//!     DycorsConfig::builder().sampling_radius(0.1).build().unwrap(),
//! );
//!
//! let evaluated = vec![vec![1.0, 1.0, 1.0], vec![-2.0, 0.0, 3.0]];
//! let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
//! let mut rng = fastrand::Rng::with_seed(42);
//!
//! let batch = generator
//!     .propose(
//!         &problem,
//!         &sphere,
//!         &evaluated[0],
//!         ExistingPoints::new(&evaluated),
//!         &WeightSchedule::new(vec![0.5, 0.95]).unwrap(),
//!         Budget::new(2, 100, 2).unwrap(),
//!         &mut rng,
//!     )
//!     .unwrap();
//!
//! assert_eq!(batch.len(), 2);
//! ```

use crate::error::{Error, Result};
use crate::merit::{DEFAULT_DTOL, ExistingPoints, MeritSelector};
use crate::problem::{OptimizationProblem, integer_bounds, validate_problem};
use crate::rng_util;
use crate::surrogate::Surrogate;
use crate::weights::WeightSchedule;

/// Number of candidates generated per problem dimension.
pub const CANDIDATES_PER_DIM: usize = 100;

/// Default perturbation radius as a fraction of each coordinate's range.
pub const DEFAULT_SAMPLING_RADIUS: f64 = 0.2;

/// Evaluation counters that drive the perturbation-probability decay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Budget {
    /// Evaluations spent on the initial design.
    pub init_evals: usize,
    /// Total evaluation budget.
    pub max_evals: usize,
    /// Evaluations completed so far.
    pub evals: usize,
}

impl Budget {
    /// Creates a validated budget.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBudget`] unless `evals >= init_evals` and
    /// `max_evals > init_evals`.
    pub fn new(init_evals: usize, max_evals: usize, evals: usize) -> Result<Self> {
        let budget = Self {
            init_evals,
            max_evals,
            evals,
        };
        budget.validate()?;
        Ok(budget)
    }

    /// Checks the counter invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBudget`] when they do not hold.
    pub fn validate(&self) -> Result<()> {
        if self.evals < self.init_evals || self.max_evals <= self.init_evals {
            return Err(Error::InvalidBudget {
                init_evals: self.init_evals,
                max_evals: self.max_evals,
                evals: self.evals,
            });
        }
        Ok(())
    }
}

/// Probability of perturbing each eligible coordinate.
///
/// `min(20 / dim, 1) * (1 - ln(evals - init + 1) / ln(max - init + 1))`,
/// floored at `min(1, 1 / dim)`. The value is largest right after the
/// initial design and reaches the floor once the budget is spent.
///
/// # Examples
///
/// ```
/// use recas::candidate::{Budget, perturbation_probability};
///
/// let start = perturbation_probability(40, Budget::new(10, 110, 10).unwrap());
/// assert!((start - 0.5).abs() < 1e-12);
///
/// let end = perturbation_probability(40, Budget::new(10, 110, 110).unwrap());
/// assert!((end - 1.0 / 40.0).abs() < 1e-12);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn perturbation_probability(dim: usize, budget: Budget) -> f64 {
    let d = dim.max(1) as f64;
    let used = budget.evals.saturating_sub(budget.init_evals) as f64;
    let span = budget.max_evals.saturating_sub(budget.init_evals) as f64;
    let decay = 1.0 - (used + 1.0).ln() / (span + 1.0).ln();
    let prob = (20.0 / d).min(1.0) * decay;
    // f64::max ignores a NaN from a zero span
    prob.max((1.0 / d).min(1.0))
}

/// Settings for candidate generation and selection.
///
/// Deserialization goes through [`DycorsConfigBuilder::build`], so a loaded
/// config is validated exactly like a built one.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawDycorsConfig")
)]
pub struct DycorsConfig {
    sampling_radius: f64,
    dtol: f64,
    subset: Option<Vec<usize>>,
}

/// Unvalidated wire form of [`DycorsConfig`]. Missing fields take defaults.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawDycorsConfig {
    #[serde(default)]
    sampling_radius: Option<f64>,
    #[serde(default)]
    dtol: Option<f64>,
    #[serde(default)]
    subset: Option<Vec<usize>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDycorsConfig> for DycorsConfig {
    type Error = Error;

    fn try_from(raw: RawDycorsConfig) -> Result<Self> {
        DycorsConfigBuilder {
            sampling_radius: raw.sampling_radius,
            dtol: raw.dtol,
            subset: raw.subset,
        }
        .build()
    }
}

impl DycorsConfig {
    /// Creates a builder for configuring a `DycorsConfig`.
    #[must_use]
    pub fn builder() -> DycorsConfigBuilder {
        DycorsConfigBuilder::new()
    }

    /// Perturbation std-dev as a fraction of each coordinate's range.
    #[must_use]
    pub fn sampling_radius(&self) -> f64 {
        self.sampling_radius
    }

    /// Minimum distance between a selected point and any known point.
    #[must_use]
    pub fn dtol(&self) -> f64 {
        self.dtol
    }

    /// Coordinates eligible for perturbation, `None` meaning all of them.
    #[must_use]
    pub fn subset(&self) -> Option<&[usize]> {
        self.subset.as_deref()
    }

    fn resolve_subset(&self, dim: usize) -> Result<Vec<usize>> {
        match &self.subset {
            None => Ok((0..dim).collect()),
            Some(subset) => {
                if let Some(&index) = subset.iter().find(|&&i| i >= dim) {
                    return Err(Error::InvalidSubset { index, dim });
                }
                Ok(subset.clone())
            }
        }
    }
}

impl Default for DycorsConfig {
    fn default() -> Self {
        Self {
            sampling_radius: DEFAULT_SAMPLING_RADIUS,
            dtol: DEFAULT_DTOL,
            subset: None,
        }
    }
}

/// Builder for configuring a [`DycorsConfig`].
///
/// All options have sensible defaults:
/// - `sampling_radius`: 0.2
/// - `dtol`: 1e-3
/// - `subset`: all coordinates
///
/// # Examples
///
/// ```
/// use recas::candidate::DycorsConfigBuilder;
///
/// let config = DycorsConfigBuilder::new()
///     .sampling_radius(0.05)
///     .dtol(1e-4)
///     .subset(vec![2, 0])
///     .build()
///     .unwrap();
/// assert_eq!(config.subset(), Some(&[0, 2][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DycorsConfigBuilder {
    sampling_radius: Option<f64>,
    dtol: Option<f64>,
    subset: Option<Vec<usize>>,
}

impl DycorsConfigBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// Builds the configured [`DycorsConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSamplingRadius`], [`Error::InvalidTolerance`]
    /// or [`Error::EmptySubset`] for invalid settings. Subset indices are
    /// checked against the problem dimension at generation time.
    pub fn build(self) -> Result<DycorsConfig> {
        let sampling_radius = self.sampling_radius.unwrap_or(DEFAULT_SAMPLING_RADIUS);
        if !sampling_radius.is_finite() || sampling_radius <= 0.0 {
            return Err(Error::InvalidSamplingRadius(sampling_radius));
        }
        let dtol = MeritSelector::new(self.dtol.unwrap_or(DEFAULT_DTOL))?.dtol();
        let subset = match self.subset {
            Some(mut subset) => {
                if subset.is_empty() {
                    return Err(Error::EmptySubset);
                }
                subset.sort_unstable();
                subset.dedup();
                Some(subset)
            }
            None => None,
        };
        Ok(DycorsConfig {
            sampling_radius,
            dtol,
            subset,
        })
    }
}

/// Generates DYCORS candidate pools and selects batches from them.
#[derive(Clone, Debug, Default)]
pub struct CandidateGenerator {
    config: DycorsConfig,
}

impl CandidateGenerator {
    /// Creates a generator with the given configuration.
    #[must_use]
    pub fn new(config: DycorsConfig) -> Self {
        Self { config }
    }

    /// The generator's configuration.
    #[must_use]
    pub fn config(&self) -> &DycorsConfig {
        &self.config
    }

    /// Builds the `100 * dim` candidate pool around `xbest`.
    ///
    /// Every candidate lies inside the box and holds integer values at the
    /// problem's integer coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error when the problem, the budget, the subset or the
    /// incumbent is invalid.
    pub fn generate_pool<P: OptimizationProblem + ?Sized>(
        &self,
        problem: &P,
        xbest: &[f64],
        budget: Budget,
        rng: &mut fastrand::Rng,
    ) -> Result<Vec<Vec<f64>>> {
        validate_problem(problem)?;
        budget.validate()?;

        let dim = problem.dim();
        let (lb, ub) = (problem.lower_bounds(), problem.upper_bounds());
        check_incumbent(xbest, lb, ub)?;
        let subset = self.config.resolve_subset(dim)?;
        let int_var = problem.int_var();

        let mut scalefactors: Vec<f64> = lb
            .iter()
            .zip(ub)
            .map(|(l, u)| self.config.sampling_radius * (u - l))
            .collect();
        for &i in int_var {
            if subset.binary_search(&i).is_ok() {
                scalefactors[i] = scalefactors[i].max(1.0);
            }
        }

        let prob_perturb = perturbation_probability(dim, budget);
        let num_cand = CANDIDATES_PER_DIM * dim;

        let mut pool = Vec::with_capacity(num_cand);
        let mut mask = vec![false; subset.len()];
        for _ in 0..num_cand {
            if subset.len() == 1 {
                mask[0] = true;
            } else {
                for m in &mut mask {
                    *m = rng_util::bernoulli(rng, prob_perturb);
                }
                if !mask.contains(&true) {
                    mask[rng.usize(0..subset.len())] = true;
                }
            }

            let mut cand = xbest.to_vec();
            for (&i, _) in subset.iter().zip(&mask).filter(|&(_, &m)| m) {
                cand[i] = rng_util::normal(rng, xbest[i], scalefactors[i]).clamp(lb[i], ub[i]);
            }
            for &j in int_var {
                let (lo, hi) = integer_bounds(lb[j], ub[j]);
                cand[j] = cand[j].round_ties_even().clamp(lo, hi);
            }
            pool.push(cand);
        }

        trace_debug!(
            pool = pool.len(),
            prob_perturb,
            evals = budget.evals,
            "candidate pool generated"
        );
        Ok(pool)
    }

    /// Generates a pool around `xbest` and selects one point per weight.
    ///
    /// The result may hold fewer points than `weights` when the pool runs
    /// out of candidates farther than `dtol` from every known point.
    ///
    /// # Errors
    ///
    /// See [`generate_pool`](Self::generate_pool) and
    /// [`MeritSelector::select`].
    #[allow(clippy::too_many_arguments)]
    pub fn propose<P, S>(
        &self,
        problem: &P,
        surrogate: &S,
        xbest: &[f64],
        existing: ExistingPoints<'_>,
        weights: &WeightSchedule,
        budget: Budget,
        rng: &mut fastrand::Rng,
    ) -> Result<Vec<Vec<f64>>>
    where
        P: OptimizationProblem + ?Sized,
        S: Surrogate + ?Sized,
    {
        let pool = self.generate_pool(problem, xbest, budget, rng)?;
        let selector = MeritSelector::new(self.config.dtol)?;
        selector.select(surrogate, &pool, existing, weights)
    }
}

/// Generates a DYCORS pool around `xbest` and selects a batch from it.
///
/// Shorthand for [`CandidateGenerator::propose`] with an explicit config.
///
/// # Errors
///
/// See [`CandidateGenerator::propose`].
#[allow(clippy::too_many_arguments)]
pub fn candidate_dycors<P, S>(
    problem: &P,
    surrogate: &S,
    xbest: &[f64],
    existing: ExistingPoints<'_>,
    weights: &WeightSchedule,
    budget: Budget,
    config: &DycorsConfig,
    rng: &mut fastrand::Rng,
) -> Result<Vec<Vec<f64>>>
where
    P: OptimizationProblem + ?Sized,
    S: Surrogate + ?Sized,
{
    CandidateGenerator::new(config.clone()).propose(
        problem, surrogate, xbest, existing, weights, budget, rng,
    )
}

fn check_incumbent(xbest: &[f64], lb: &[f64], ub: &[f64]) -> Result<()> {
    if xbest.len() != lb.len() {
        return Err(Error::DimensionMismatch {
            expected: lb.len(),
            got: xbest.len(),
            point_index: 0,
        });
    }
    for (index, ((&value, &low), &high)) in xbest.iter().zip(lb).zip(ub).enumerate() {
        if !(low..=high).contains(&value) {
            return Err(Error::IncumbentOutOfBounds { index, value });
        }
    }
    Ok(())
}
