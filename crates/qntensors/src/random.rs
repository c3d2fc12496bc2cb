//! Uniform random sampling for block fills.

use rand::Rng;
use rand::distr::StandardUniform;

use crate::scalar::{Scalar, c64};

/// Trait for scalar types that can be sampled uniformly from `[low, high)`.
pub trait RandomUniform: Scalar {
    /// Sample a random value in `[low, high)`.
    ///
    /// Complex types sample the real and imaginary parts independently.
    fn sample_range<R: Rng>(rng: &mut R, low: f64, high: f64) -> Self;
}

impl RandomUniform for f64 {
    fn sample_range<R: Rng>(rng: &mut R, low: f64, high: f64) -> Self {
        let u: f64 = rng.sample(StandardUniform);
        u * (high - low) + low
    }
}

impl RandomUniform for c64 {
    fn sample_range<R: Rng>(rng: &mut R, low: f64, high: f64) -> Self {
        let re: f64 = rng.sample(StandardUniform);
        let im: f64 = rng.sample(StandardUniform);
        c64::new(re * (high - low) + low, im * (high - low) + low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_sample_range_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let v = f64::sample_range(&mut rng, -2.0, 3.0);
            assert!((-2.0..3.0).contains(&v));
        }
    }

    #[test]
    fn test_sample_range_complex_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let z = c64::sample_range(&mut rng, 0.5, 1.0);
            assert!((0.5..1.0).contains(&z.re));
            assert!((0.5..1.0).contains(&z.im));
        }
    }

    #[test]
    fn test_seeded_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(
                f64::sample_range(&mut a, 0.0, 1.0),
                f64::sample_range(&mut b, 0.0, 1.0)
            );
        }
    }
}
