//! Per-source sampling policies
//!
//! A sampling policy decides, once per tick, how many independent draws the
//! orchestrator takes from one source. The four variants form a closed sum
//! type, so the cross-section-specific operations are only reachable on the
//! cross-section variant; there is no runtime type inspection anywhere.
//!
//! All parameter validation happens in the constructors. A policy that
//! constructed successfully can never fail at draw time.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::rng::RngManager;

/// Fixed target and beam constants used to turn a physical cross section
/// (in picobarn) into a Poisson mean per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LuminosityConstants {
    /// Target thickness
    pub target_thickness: f64,

    /// Reference electron count per bunch
    pub electrons_per_bunch: f64,

    /// Target density
    pub target_density: f64,
}

impl Default for LuminosityConstants {
    fn default() -> Self {
        Self {
            target_thickness: 0.0004062,
            electrons_per_bunch: 625.0,
            target_density: 6.306e-2,
        }
    }
}

impl LuminosityConstants {
    /// Poisson mean for the given cross section:
    /// `density * electrons * thickness * 1e-12 * cross_section`.
    pub fn poisson_mean(&self, cross_section: f64) -> f64 {
        self.target_density * self.electrons_per_bunch * self.target_thickness * 1e-12
            * cross_section
    }
}

/// How many draws to take from a source in one tick.
///
/// # Example
/// ```
/// use overlay_engine_core_rs::{RngManager, SamplingPolicy};
///
/// let policy = SamplingPolicy::periodic(5).unwrap();
/// let mut rng = RngManager::new(1);
/// assert_eq!(policy.number_of_events(10, &mut rng), 1);
/// assert_eq!(policy.number_of_events(11, &mut rng), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SamplingPolicy {
    /// Fixed number of draws per tick (parameter truncated to integer)
    Fixed { count: f64 },

    /// Poisson-distributed draw count; may be 0
    Poisson { mean: f64 },

    /// One draw exactly when the event id is divisible by the modulus
    Periodic { modulus: u64 },

    /// Poisson with mean derived from a physical cross section
    CrossSection {
        /// Cross section in picobarn; 0 until pulled from a file header
        cross_section: f64,
        /// Constants for the luminosity calculation
        luminosity: LuminosityConstants,
        /// Derived Poisson mean, recomputed whenever the cross section changes
        mean: f64,
    },
}

impl SamplingPolicy {
    /// Fixed sampling. The count must be finite and non-negative.
    pub fn fixed(count: f64) -> Result<Self, ConfigError> {
        if !count.is_finite() || count < 0.0 {
            return Err(ConfigError::InvalidSampling(format!(
                "fixed count must be finite and non-negative, got {}",
                count
            )));
        }
        Ok(SamplingPolicy::Fixed { count })
    }

    /// Poisson sampling. The mean must be finite and non-negative.
    pub fn poisson(mean: f64) -> Result<Self, ConfigError> {
        if !mean.is_finite() || mean < 0.0 {
            return Err(ConfigError::InvalidSampling(format!(
                "Poisson mean must be finite and non-negative, got {}",
                mean
            )));
        }
        Ok(SamplingPolicy::Poisson { mean })
    }

    /// Periodic sampling. The modulus must be positive; a zero modulus would
    /// divide by zero at draw time, so it is rejected here.
    pub fn periodic(modulus: i64) -> Result<Self, ConfigError> {
        if modulus <= 0 {
            return Err(ConfigError::InvalidSampling(format!(
                "periodic modulus must be positive, got {}",
                modulus
            )));
        }
        Ok(SamplingPolicy::Periodic {
            modulus: modulus as u64,
        })
    }

    /// Cross-section-derived sampling with default luminosity constants.
    ///
    /// A cross section of 0 means "not yet known": the source pulls the value
    /// from its first open file's header during initialization.
    pub fn cross_section(cross_section: f64) -> Result<Self, ConfigError> {
        if !cross_section.is_finite() || cross_section < 0.0 {
            return Err(ConfigError::InvalidSampling(format!(
                "cross section must be finite and non-negative, got {}",
                cross_section
            )));
        }
        let luminosity = LuminosityConstants::default();
        let mean = luminosity.poisson_mean(cross_section);
        Ok(SamplingPolicy::CrossSection {
            cross_section,
            luminosity,
            mean,
        })
    }

    /// Number of draws to take for the given destination event this tick.
    ///
    /// Never negative; Poisson variants draw from the shared run RNG.
    pub fn number_of_events(&self, event_id: u64, rng: &mut RngManager) -> u64 {
        match self {
            SamplingPolicy::Fixed { count } => *count as u64,
            SamplingPolicy::Poisson { mean } => rng.poisson(*mean),
            SamplingPolicy::Periodic { modulus } => {
                if event_id % modulus == 0 {
                    1
                } else {
                    0
                }
            }
            SamplingPolicy::CrossSection { mean, .. } => rng.poisson(*mean),
        }
    }

    /// Derived Poisson mean, if this policy has one.
    pub fn poisson_mean(&self) -> Option<f64> {
        match self {
            SamplingPolicy::Poisson { mean } => Some(*mean),
            SamplingPolicy::CrossSection { mean, .. } => Some(*mean),
            _ => None,
        }
    }
}
