//! Source of uniform random draws for the probabilistic mechanics.
//!
//! Production code wraps a `rand` generator in [`RngDraws`]. Tests and
//! replays use [`FixedDraws`] to pin every outcome.

use std::collections::VecDeque;

/// Supplies independent draws from `Uniform[0, 1)`.
pub trait Draws {
    /// Next draw.
    fn uniform(&mut self) -> f64;
}

/// Draws taken from a `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDraws<R> {
    rng: R,
}

impl<R: rand::Rng> RngDraws<R> {
    /// Wrap a generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: rand::Rng> Draws for RngDraws<R> {
    fn uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// A scripted sequence of draws.
///
/// Once the script runs out every further draw returns the fallback value.
#[derive(Debug, Clone)]
pub struct FixedDraws {
    script: VecDeque<f64>,
    fallback: f64,
}

impl FixedDraws {
    /// Draws that follow `script`, then `0.99` forever (nothing triggers).
    pub fn new(script: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: 0.99,
        }
    }

    /// Every draw returns `value`.
    pub fn constant(value: f64) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: value,
        }
    }

    /// Number of scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Draws for FixedDraws {
    fn uniform(&mut self) -> f64 {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn rng_draws_stay_in_unit_interval() {
        let mut draws = RngDraws::new(SmallRng::seed_from_u64(42));
        for _ in 0..1000 {
            let u = draws.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn seeded_draws_repeat() {
        let mut a = RngDraws::new(SmallRng::seed_from_u64(7));
        let mut b = RngDraws::new(SmallRng::seed_from_u64(7));
        for _ in 0..10 {
            assert_eq!(a.uniform(), b.uniform());
        }
    }

    #[test]
    fn fixed_draws_fall_back() {
        let mut draws = FixedDraws::new([0.1, 0.2]);
        assert_eq!(draws.uniform(), 0.1);
        assert_eq!(draws.remaining(), 1);
        assert_eq!(draws.uniform(), 0.2);
        assert_eq!(draws.uniform(), 0.99);

        let mut low = FixedDraws::constant(0.0);
        assert_eq!(low.uniform(), 0.0);
    }
}
