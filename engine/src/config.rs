//! Serializable configuration and setup-time validation
//!
//! The macro/command front-end that drives this engine lives outside the
//! crate; its contract is that every textual command maps 1:1 onto a setter
//! here or on [`EventSource`](crate::source::EventSource). These structs are
//! the serde-facing mirror of the runtime types: they can be loaded from
//! JSON, validated once, and turned into live policies, transforms, and
//! sources. All validation failures are raised here, at setup time, never
//! at draw time.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sampling::SamplingPolicy;
use crate::source::ReadMode;
use crate::transform::Transform;

/// Setup-time configuration error. Always fatal; the run never starts.
// Display/Error are implemented by hand: thiserror's derive treats any field
// named `source` as an error cause, but here `source` is the event-source name.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    InvalidSampling(String),

    InvalidTransform(String),

    InvalidReadMode { source: String, mode: ReadMode },

    NoFiles(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSampling(msg) => {
                write!(f, "Invalid sampling parameter: {msg}")
            }
            ConfigError::InvalidTransform(msg) => {
                write!(f, "Invalid transform parameter: {msg}")
            }
            ConfigError::InvalidReadMode { source, mode } => write!(
                f,
                "Read mode {mode:?} requires random access, which source '{source}' does not support"
            ),
            ConfigError::NoFiles(source) => {
                write!(f, "Source '{source}' has no input files")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Sampling policy selection for a source.
///
/// Mirrors [`SamplingPolicy`]; `build` validates parameters and constructs
/// the runtime policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum SamplingConfig {
    /// Fixed number of draws per tick (truncated to integer)
    Fixed {
        count: f64,
    },

    /// Poisson-distributed draw count
    Poisson {
        mean: f64,
    },

    /// One draw every `modulus` ticks
    Periodic {
        modulus: i64,
    },

    /// Poisson with mean derived from a physical cross section.
    /// A zero cross section means "take it from the file header".
    CrossSection {
        #[serde(default)]
        cross_section: f64,
    },
}

impl SamplingConfig {
    /// Validate and build the runtime sampling policy.
    pub fn build(&self) -> Result<SamplingPolicy, ConfigError> {
        match self {
            SamplingConfig::Fixed { count } => SamplingPolicy::fixed(*count),
            SamplingConfig::Poisson { mean } => SamplingPolicy::poisson(*mean),
            SamplingConfig::Periodic { modulus } => SamplingPolicy::periodic(*modulus),
            SamplingConfig::CrossSection { cross_section } => {
                SamplingPolicy::cross_section(*cross_section)
            }
        }
    }
}

/// Transform selection for a source's chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformConfig {
    /// Shift every vertex by a fixed offset
    Translate { dx: f64, dy: f64, dz: f64 },

    /// Gaussian vertex smearing, one draw per axis per event
    GaussianSmear {
        sigma_x: f64,
        sigma_y: f64,
        sigma_z: f64,
    },

    /// Rotate positions and momenta in the x-z plane
    Rotate { theta: f64 },

    /// Uniform vertex smearing within [-w/2, +w/2] per axis
    UniformSmear {
        width_x: f64,
        width_y: f64,
        width_z: f64,
    },
}

impl TransformConfig {
    /// Validate and build the runtime transform.
    pub fn build(&self) -> Result<Transform, ConfigError> {
        match self {
            TransformConfig::Translate { dx, dy, dz } => Transform::translate(*dx, *dy, *dz),
            TransformConfig::GaussianSmear {
                sigma_x,
                sigma_y,
                sigma_z,
            } => Transform::gaussian_smear(*sigma_x, *sigma_y, *sigma_z),
            TransformConfig::Rotate { theta } => Transform::rotate(*theta),
            TransformConfig::UniformSmear {
                width_x,
                width_y,
                width_z,
            } => Transform::uniform_smear(*width_x, *width_y, *width_z),
        }
    }
}

/// Complete configuration for one event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique source name
    pub name: String,

    /// Absolute paths of the input event files, drained in order
    pub files: Vec<PathBuf>,

    /// How records are read from each open file
    #[serde(default = "default_read_mode")]
    pub read_mode: ReadMode,

    /// How many draws to take per tick
    pub sampling: SamplingConfig,

    /// Geometric transforms applied to every draw, in order
    #[serde(default)]
    pub transforms: Vec<TransformConfig>,

    /// Open named double parameters (e.g. energy, current, weight)
    #[serde(default)]
    pub params: HashMap<String, f64>,
}

fn default_read_mode() -> ReadMode {
    ReadMode::Sequential
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_config_round_trip() {
        let config = SamplingConfig::Periodic { modulus: 5 };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("periodic"));
        let back: SamplingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_invalid_periodic_modulus_rejected() {
        assert!(SamplingConfig::Periodic { modulus: 0 }.build().is_err());
        assert!(SamplingConfig::Periodic { modulus: -3 }.build().is_err());
        assert!(SamplingConfig::Periodic { modulus: 5 }.build().is_ok());
    }

    #[test]
    fn test_invalid_transform_rejected() {
        let config = TransformConfig::GaussianSmear {
            sigma_x: -0.1,
            sigma_y: 0.0,
            sigma_z: 0.0,
        };
        assert!(config.build().is_err());
    }

    #[test]
    fn test_source_config_from_json() {
        let json = r#"{
            "name": "beam",
            "files": ["/data/beam_0.jsonl", "/data/beam_1.jsonl"],
            "read_mode": "Random",
            "sampling": {"distribution": "poisson", "mean": 2.5},
            "transforms": [{"kind": "rotate", "theta": 0.0305}]
        }"#;

        let config: SourceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name, "beam");
        assert_eq!(config.files.len(), 2);
        assert_eq!(config.read_mode, ReadMode::Random);
        assert_eq!(config.transforms.len(), 1);
        assert!(config.params.is_empty());
    }
}
