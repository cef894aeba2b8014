//! Multipliers applied to each simulated revenue bucket.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces one multiplier per revenue bucket.
pub trait VarianceSource: Send + Sync + fmt::Debug {
    /// A factor in `[min, max]`.
    fn factor(&self, min: f64, max: f64) -> f64;
}

/// Draw from the thread-local RNG. Output differs call to call.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomVariance;

impl VarianceSource for RandomVariance {
    fn factor(&self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Reproducible draws from a seeded RNG.
pub struct SeededVariance {
    seed: u64,
    rng: Mutex<StdRng>,
}

impl SeededVariance {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl fmt::Debug for SeededVariance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededVariance").field("seed", &self.seed).finish_non_exhaustive()
    }
}

impl VarianceSource for SeededVariance {
    fn factor(&self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(min..=max)
    }
}

/// Always the same factor, clamped into the requested bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedVariance(pub f64);

impl Default for FixedVariance {
    fn default() -> Self {
        Self(1.0)
    }
}

impl VarianceSource for FixedVariance {
    fn factor(&self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.0.clamp(min, max)
    }
}
