//! Synthetic round-trip-time sampling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fraction of the baseline used as the jitter half-width.
const JITTER_FRACTION: f64 = 0.3;

/// Samples RTTs around a node's baseline latency. The random source is
/// injected so runs can be reproduced with a fixed seed.
pub struct RttSampler<R: Rng = StdRng> {
    rng: R,
}

impl RttSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> RttSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// One sample: ±30% uniform jitter around `baseline_ms`, rounded to
    /// one decimal place, clamped to a 1.0 ms floor.
    pub fn sample(&mut self, baseline_ms: f64) -> f64 {
        let jitter = self.rng.gen_range(-0.5..0.5) * 2.0 * baseline_ms * JITTER_FRACTION;
        (((baseline_ms + jitter) * 10.0).round() / 10.0).max(1.0)
    }
}
