//! xorshift64* random number generator
//!
//! This is a fast, high-quality PRNG that is deterministic and suitable
//! for simulation purposes.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. This is CRITICAL for:
//! - Debugging (reproduce an exact run, including shuffled read orders)
//! - Testing (verify behavior)
//! - Research (validate statistical results)
//!
//! On top of the raw generator this type layers the draws the overlay engine
//! needs: uniform integer ranges, Poisson counts for event sampling, Gaussian
//! shifts for vertex smearing, and Fisher-Yates shuffles for randomized read
//! orders.

use serde::{Deserialize, Serialize};

/// Above this mean, Poisson draws switch to a Gaussian approximation.
const POISSON_GAUSSIAN_CUTOFF: f64 = 80.0;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use overlay_engine_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let value = rng.next();
/// let index = rng.range(0, 100); // [0, 100)
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (64-bit)
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    pub fn new(seed: u64) -> Self {
        // Ensure seed is never zero (xorshift requirement)
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    ///
    /// This advances the internal state and returns a random value.
    pub fn next(&mut self) -> u64 {
        // xorshift64* algorithm
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = (max - min) as u64;
        min + (value % range_size) as i64
    }

    /// Get current RNG state (for checkpointing/replay)
    ///
    /// A generator recreated from this state continues the same sequence.
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Convert to [0.0, 1.0) by dividing by 2^64
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Sample from a standard normal distribution (Box-Muller transform).
    pub fn next_gaussian(&mut self) -> f64 {
        let u1 = self.next_f64();
        let u2 = self.next_f64();
        // 1 - u1 is in (0, 1], so the log is always finite
        (-2.0 * (1.0 - u1).ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Sample a count from a Poisson distribution with the given mean.
    ///
    /// Uses Knuth's multiplication method for small means and a rounded
    /// Gaussian approximation above [`POISSON_GAUSSIAN_CUTOFF`], where the
    /// product of uniforms would underflow.
    ///
    /// # Panics
    /// Panics if the mean is negative or not finite.
    pub fn poisson(&mut self, mean: f64) -> u64 {
        assert!(
            mean >= 0.0 && mean.is_finite(),
            "Poisson mean must be finite and non-negative"
        );

        if mean == 0.0 {
            return 0;
        }

        if mean > POISSON_GAUSSIAN_CUTOFF {
            let draw = mean + mean.sqrt() * self.next_gaussian();
            return draw.max(0.0).round() as u64;
        }

        let limit = (-mean).exp();
        let mut product = self.next_f64();
        let mut count = 0u64;
        while product > limit {
            product *= self.next_f64();
            count += 1;
        }
        count
    }

    /// Shuffle a slice in place (Fisher-Yates).
    ///
    /// Consumes exactly `slice.len() - 1` draws for a non-empty slice, so
    /// shuffles are reproducible and their RNG cost is predictable.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.range(0, (i + 1) as i64) as usize;
            slice.swap(i, j);
        }
    }
}
