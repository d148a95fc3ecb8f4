//! Box-constrained problem descriptors.
//!
//! The candidate generator only needs the geometry of a problem: its
//! dimension, the box `[lb, ub]` and which coordinates are integer-valued.
//! Evaluating the objective is the caller's job, so the
//! [`OptimizationProblem`] trait exposes nothing else.
//!
//! # Example
//!
//! ```
//! use recas::problem::{BoxProblem, OptimizationProblem};
//!
//! let problem = BoxProblem::new(vec![0.0, -5.0], vec![1.0, 5.0])
//!     .unwrap()
//!     .with_int_var(vec![1])
//!     .unwrap()
//!     .with_name("mixed")
//!     .with_n_objectives(3);
//!
//! assert_eq!(problem.dim(), 2);
//! assert_eq!(problem.int_var(), &[1]);
//! assert_eq!(problem.n_objectives(), 3);
//! ```

use crate::error::{Error, Result};

/// Geometry of a box-constrained optimization problem.
///
/// Implementors must return bound vectors of length [`dim`](Self::dim) and
/// integer indices in `0..dim`. [`validate_problem`] checks both.
pub trait OptimizationProblem {
    /// Number of decision variables.
    fn dim(&self) -> usize;

    /// Lower bound of every coordinate.
    fn lower_bounds(&self) -> &[f64];

    /// Upper bound of every coordinate.
    fn upper_bounds(&self) -> &[f64];

    /// Indices of integer-valued coordinates.
    fn int_var(&self) -> &[usize] {
        &[]
    }

    /// Number of objectives returned by the (external) evaluator.
    fn n_objectives(&self) -> usize {
        1
    }

    /// Short name used in result file names.
    fn name(&self) -> &str {
        "problem"
    }
}

/// A plain problem descriptor holding its bounds and integer indices.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxProblem {
    lb: Vec<f64>,
    ub: Vec<f64>,
    int_var: Vec<usize>,
    n_objectives: usize,
    name: String,
}

impl BoxProblem {
    /// Creates a continuous single-objective problem over `[lb, ub]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroDimensions`], [`Error::BoundsLengthMismatch`] or
    /// [`Error::InvalidBounds`] when the box is malformed.
    pub fn new(lb: Vec<f64>, ub: Vec<f64>) -> Result<Self> {
        check_bounds(lb.len(), &lb, &ub)?;
        Ok(Self {
            lb,
            ub,
            int_var: Vec::new(),
            n_objectives: 1,
            name: String::from("problem"),
        })
    }

    /// Marks coordinates as integer-valued. Duplicates are removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIntegerVariable`] for an out-of-range index
    /// and [`Error::EmptyIntegerRange`] when an integer coordinate's bounds
    /// contain no integer.
    pub fn with_int_var(mut self, mut int_var: Vec<usize>) -> Result<Self> {
        int_var.sort_unstable();
        int_var.dedup();
        check_int_var(&self.lb, &self.ub, &int_var)?;
        self.int_var = int_var;
        Ok(self)
    }

    /// Sets the problem name used in result file names.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the number of objectives.
    #[must_use]
    pub fn with_n_objectives(mut self, n_objectives: usize) -> Self {
        self.n_objectives = n_objectives;
        self
    }
}

impl OptimizationProblem for BoxProblem {
    fn dim(&self) -> usize {
        self.lb.len()
    }

    fn lower_bounds(&self) -> &[f64] {
        &self.lb
    }

    fn upper_bounds(&self) -> &[f64] {
        &self.ub
    }

    fn int_var(&self) -> &[usize] {
        &self.int_var
    }

    fn n_objectives(&self) -> usize {
        self.n_objectives
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Checks that a problem's geometry is usable for candidate generation.
///
/// # Errors
///
/// Returns the first violated precondition: zero dimension, bound vectors
/// of the wrong length, `lb_i >= ub_i`, or a malformed integer index.
pub fn validate_problem<P: OptimizationProblem + ?Sized>(problem: &P) -> Result<()> {
    let (lb, ub) = (problem.lower_bounds(), problem.upper_bounds());
    check_bounds(problem.dim(), lb, ub)?;
    check_int_var(lb, ub, problem.int_var())
}

fn check_bounds(dim: usize, lb: &[f64], ub: &[f64]) -> Result<()> {
    if dim == 0 {
        return Err(Error::ZeroDimensions);
    }
    if lb.len() != dim || ub.len() != dim {
        return Err(Error::BoundsLengthMismatch {
            expected: dim,
            lower: lb.len(),
            upper: ub.len(),
        });
    }
    for (index, (&low, &high)) in lb.iter().zip(ub).enumerate() {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(Error::InvalidBounds { index, low, high });
        }
    }
    Ok(())
}

fn check_int_var(lb: &[f64], ub: &[f64], int_var: &[usize]) -> Result<()> {
    let dim = lb.len();
    for &index in int_var {
        let (Some(&low), Some(&high)) = (lb.get(index), ub.get(index)) else {
            return Err(Error::InvalidIntegerVariable { index, dim });
        };
        if low.ceil() > high.floor() {
            return Err(Error::EmptyIntegerRange { index, low, high });
        }
    }
    Ok(())
}

/// Integer-feasible bounds of coordinate `i`: `[ceil(lb), floor(ub)]`.
pub(crate) fn integer_bounds(low: f64, high: f64) -> (f64, f64) {
    (low.ceil(), high.floor())
}
