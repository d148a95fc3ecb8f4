//! Surrogate model contract.
//!
//! A surrogate stands in for the expensive objective. The selector only
//! ever asks it for point predictions, lower being better. Fitting and
//! retraining happen outside this crate: build a new surrogate from the
//! latest evaluations and hand it to
//! [`DycorsSession::ask`](crate::session::DycorsSession::ask) or
//! [`weighted_distance_merit`](crate::merit::weighted_distance_merit).
//!
//! Any `Fn(&[f64]) -> f64` closure is a surrogate:
//!
//! ```
//! use recas::surrogate::Surrogate;
//!
//! let sphere = |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>();
//! let preds = sphere.predict(&[vec![1.0, 2.0], vec![0.0, 0.0]]);
//! assert_eq!(preds, vec![5.0, 0.0]);
//! ```

/// A model predicting a scalar score for each candidate point.
///
/// `predict` must return exactly one value per input point, in input order,
/// and be deterministic within a single call.
pub trait Surrogate {
    /// Predicts a score for each point. Lower is better.
    fn predict(&self, points: &[Vec<f64>]) -> Vec<f64>;
}

impl<F> Surrogate for F
where
    F: Fn(&[f64]) -> f64,
{
    fn predict(&self, points: &[Vec<f64>]) -> Vec<f64> {
        points.iter().map(|p| self(p.as_slice())).collect()
    }
}
