//! Seedable bounded Gaussian random-walk generator.
//!
//! Each call to [`RandomWalk::step`] nudges a value by a Gaussian delta and
//! reflects against the provided `[min, max]` bounds, so traces stay smooth
//! with no discontinuity at a boundary. The generator is deterministic for a
//! given seed: identical seed, identical sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

use crate::schema::{CHANNELS, col};

/// Probability per call that PAR snaps to its night floor.
const PAR_FLOOR_PROB: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct RandomWalk {
    rng: ChaCha8Rng,
}

impl RandomWalk {
    /// Create a walk generator. `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { rng }
    }

    /// Advance `value` by a Gaussian step and keep it within bounds.
    ///
    /// A result below `min` reflects to `min + (min - v)`; above `max`, to
    /// `max - (v - max)`. The final value is hard-clamped into `[min, max]`.
    pub fn step(&mut self, value: f64, min: f64, max: f64, sigma: f64) -> f64 {
        let delta: f64 = self.rng.sample::<f64, _>(StandardNormal) * sigma;
        let mut next = value + delta;
        if next < min {
            next = min + (min - next);
        }
        if next > max {
            next = max - (next - max);
        }
        next.clamp(min, max)
    }

    /// Occasionally force PAR to its low floor, mimicking night readings.
    ///
    /// Returns `Some(floor)` with 10% probability; `None` means the caller
    /// should perform a normal walk step instead.
    pub fn par_floor(&mut self) -> Option<f64> {
        if self.rng.gen_bool(PAR_FLOOR_PROB) {
            Some(CHANNELS[col::PAR].span.0)
        } else {
            None
        }
    }
}
