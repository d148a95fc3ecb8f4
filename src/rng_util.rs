/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Sample a value from the standard normal distribution using the Box-Muller transform.
pub(crate) fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    // u1 in (0, 1] keeps ln(u1) finite
    let u1 = 1.0 - rng.f64();
    let u2 = f64_range(rng, 0.0, core::f64::consts::TAU);
    (-2.0 * u1.ln()).sqrt() * u2.cos()
}

/// Sample from `Normal(mean, sd)`.
#[inline]
pub(crate) fn normal(rng: &mut fastrand::Rng, mean: f64, sd: f64) -> f64 {
    mean + sd * standard_normal(rng)
}

/// Bernoulli trial that succeeds with probability `p`.
#[inline]
pub(crate) fn bernoulli(rng: &mut fastrand::Rng, p: f64) -> bool {
    rng.f64() < p
}
