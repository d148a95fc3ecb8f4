#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a problem has no coordinates.
    #[error("problem must have at least one dimension")]
    ZeroDimensions,

    /// Returned when the bound vectors do not match the problem dimension.
    #[error(
        "bounds length mismatch: expected {expected} values, got {lower} lower and {upper} upper"
    )]
    BoundsLengthMismatch {
        /// The problem dimension.
        expected: usize,
        /// Length of the lower bound vector.
        lower: usize,
        /// Length of the upper bound vector.
        upper: usize,
    },

    /// Returned when a lower bound is not strictly below its upper bound.
    #[error("invalid bounds at coordinate {index}: low ({low}) must be less than high ({high})")]
    InvalidBounds {
        /// The offending coordinate.
        index: usize,
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when an integer-variable index is outside `0..dim`.
    #[error("integer variable index {index} is out of range for dimension {dim}")]
    InvalidIntegerVariable {
        /// The offending index.
        index: usize,
        /// The problem dimension.
        dim: usize,
    },

    /// Returned when an integer coordinate's bounds enclose no integer.
    #[error("integer coordinate {index} has no integer in [{low}, {high}]")]
    EmptyIntegerRange {
        /// The offending coordinate.
        index: usize,
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when a perturbation subset names a coordinate outside `0..dim`.
    #[error("perturbation subset index {index} is out of range for dimension {dim}")]
    InvalidSubset {
        /// The offending index.
        index: usize,
        /// The problem dimension.
        dim: usize,
    },

    /// Returned when the perturbation subset is empty.
    #[error("perturbation subset cannot be empty")]
    EmptySubset,

    /// Returned when a weight lies outside `[0, 1]`.
    #[error("invalid weight at position {index}: {weight} must be in [0.0, 1.0]")]
    InvalidWeight {
        /// Position of the weight in the schedule.
        index: usize,
        /// The offending weight.
        weight: f64,
    },

    /// Returned when the sampling radius is not a finite positive number.
    #[error("invalid sampling radius: {0} must be positive and finite")]
    InvalidSamplingRadius(f64),

    /// Returned when the distance tolerance is negative or not finite.
    #[error("invalid distance tolerance: {0} must be non-negative and finite")]
    InvalidTolerance(f64),

    /// Returned when the evaluation counters are inconsistent.
    #[error(
        "invalid evaluation budget: need evals ({evals}) >= init_evals ({init_evals}) and max_evals ({max_evals}) > init_evals"
    )]
    InvalidBudget {
        /// Number of initial-design evaluations.
        init_evals: usize,
        /// Total evaluation budget.
        max_evals: usize,
        /// Evaluations completed so far.
        evals: usize,
    },

    /// Returned when a point has the wrong number of coordinates.
    #[error("dimension mismatch: expected {expected} coordinates but point {point_index} has {got}")]
    DimensionMismatch {
        /// The expected number of coordinates.
        expected: usize,
        /// The actual number of coordinates.
        got: usize,
        /// Index of the point within its collection.
        point_index: usize,
    },

    /// Returned when the incumbent lies outside the box.
    #[error("incumbent coordinate {index} ({value}) lies outside its bounds")]
    IncumbentOutOfBounds {
        /// The offending coordinate.
        index: usize,
        /// The coordinate value.
        value: f64,
    },

    /// Returned when a told or pending point lies outside the box.
    #[error("point coordinate {index} ({value}) lies outside its bounds")]
    PointOutOfBounds {
        /// The offending coordinate.
        index: usize,
        /// The coordinate value.
        value: f64,
    },

    /// Returned when the surrogate returns the wrong number of predictions.
    #[error("surrogate returned {got} predictions for {expected} candidates")]
    PredictionLengthMismatch {
        /// Number of candidates passed to the surrogate.
        expected: usize,
        /// Number of predictions returned.
        got: usize,
    },

    /// Returned when the surrogate predicts NaN or an infinite value.
    #[error("surrogate prediction for candidate {index} is not finite")]
    NonFinitePrediction {
        /// Index of the candidate.
        index: usize,
    },

    /// Returned when an objective vector has the wrong length.
    #[error("objective dimension mismatch: expected {expected} values, got {got}")]
    ObjectiveDimensionMismatch {
        /// The expected number of objective values.
        expected: usize,
        /// The actual number of objective values.
        got: usize,
    },

    /// Returned when a batch is requested before any point has been evaluated.
    #[error("no completed evaluations available")]
    NoCompletedEvaluations,

    /// Returned when cancelling a point that is not pending.
    #[error("point is not pending evaluation")]
    UnknownPendingPoint,
}

pub type Result<T> = core::result::Result<T, Error>;
