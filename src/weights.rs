//! Weight schedules for the merit blend.
//!
//! Each weight `w` picks one point: the merit is
//! `w * prediction + (1 - w) * (1 - distance)`, so `w = 0` is pure
//! exploration and `w = 1` trusts the surrogate completely. A batch of
//! `n` points uses `n` weights, consumed in order.

use crate::error::{Error, Result};

/// The repeating weight pattern used when no other pattern is configured.
pub const DEFAULT_WEIGHT_PATTERN: [f64; 4] = [0.3, 0.5, 0.8, 0.95];

/// An ordered list of weights in `[0, 1]`, one per point to select.
///
/// # Examples
///
/// ```
/// use recas::weights::WeightSchedule;
///
/// let weights = WeightSchedule::new(vec![0.0, 0.5, 1.0]).unwrap();
/// assert_eq!(weights.len(), 3);
///
/// assert!(WeightSchedule::new(vec![1.5]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<f64>")
)]
pub struct WeightSchedule(Vec<f64>);

impl WeightSchedule {
    /// Creates a schedule, rejecting weights outside `[0, 1]` (and NaN).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] naming the first bad weight.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        check_weights(&weights)?;
        Ok(Self(weights))
    }

    /// Creates a schedule of `len` weights taken cyclically from `pattern`,
    /// starting at position `offset`.
    ///
    /// Consecutive batches continue the cycle by advancing `offset` by the
    /// previous batch size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] when `pattern` holds a bad weight.
    /// An empty pattern yields an empty schedule.
    ///
    /// # Examples
    ///
    /// ```
    /// use recas::weights::WeightSchedule;
    ///
    /// let w = WeightSchedule::cyclic(&[0.3, 0.5, 0.8], 2, 4).unwrap();
    /// assert_eq!(w.as_slice(), &[0.8, 0.3, 0.5, 0.8]);
    /// ```
    pub fn cyclic(pattern: &[f64], offset: usize, len: usize) -> Result<Self> {
        check_weights(pattern)?;
        if pattern.is_empty() {
            return Ok(Self(Vec::new()));
        }
        let weights = pattern.iter().copied().cycle().skip(offset % pattern.len()).take(len);
        Ok(Self(weights.collect()))
    }

    /// Number of weights, i.e. the largest batch this schedule can select.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the schedule holds no weights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The weights as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterates the weights in selection order.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl TryFrom<Vec<f64>> for WeightSchedule {
    type Error = Error;

    fn try_from(weights: Vec<f64>) -> Result<Self> {
        Self::new(weights)
    }
}

fn check_weights(weights: &[f64]) -> Result<()> {
    match weights
        .iter()
        .position(|w| !(0.0..=1.0).contains(w))
    {
        Some(index) => Err(Error::InvalidWeight {
            index,
            weight: weights[index],
        }),
        None => Ok(()),
    }
}
