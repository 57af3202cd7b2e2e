//! Geometric event transforms
//!
//! A source's transform chain reshapes each drawn event before it is
//! overlaid: vertex positions are shifted, smeared, or rotated, and for
//! rotations every particle's momentum is rotated recursively through its
//! daughter chain. Transforms never change particle identity, energy, or
//! parentage.
//!
//! Smearing transforms draw one shift per axis per application from the
//! shared run RNG and apply it to every vertex of the event, so repeated
//! applications are independent draws.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::models::event::PrimaryEvent;
use crate::models::particle::Particle;
use crate::rng::RngManager;

/// One geometric transform over an event's vertices and particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    /// Shift every vertex by a fixed offset
    Translate { dx: f64, dy: f64, dz: f64 },

    /// Add a Gaussian shift per axis (sigma > 0 axes only)
    GaussianSmear {
        sigma_x: f64,
        sigma_y: f64,
        sigma_z: f64,
    },

    /// Rotate vertex positions and particle momenta in the x-z plane
    Rotate { theta: f64 },

    /// Add a uniform shift in [-w/2, +w/2] per axis (width > 0 axes only)
    UniformSmear {
        width_x: f64,
        width_y: f64,
        width_z: f64,
    },
}

impl Transform {
    /// Fixed vertex translation.
    pub fn translate(dx: f64, dy: f64, dz: f64) -> Result<Self, ConfigError> {
        for (axis, value) in [("dx", dx), ("dy", dy), ("dz", dz)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidTransform(format!(
                    "translate {} must be finite, got {}",
                    axis, value
                )));
            }
        }
        Ok(Transform::Translate { dx, dy, dz })
    }

    /// Gaussian vertex smearing. Sigmas must be finite and non-negative;
    /// a zero sigma disables that axis.
    pub fn gaussian_smear(sigma_x: f64, sigma_y: f64, sigma_z: f64) -> Result<Self, ConfigError> {
        for (axis, value) in [("sigma_x", sigma_x), ("sigma_y", sigma_y), ("sigma_z", sigma_z)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTransform(format!(
                    "smear {} must be finite and non-negative, got {}",
                    axis, value
                )));
            }
        }
        Ok(Transform::GaussianSmear {
            sigma_x,
            sigma_y,
            sigma_z,
        })
    }

    /// Rotation by a fixed angle (radians) in the x-z plane.
    pub fn rotate(theta: f64) -> Result<Self, ConfigError> {
        if !theta.is_finite() {
            return Err(ConfigError::InvalidTransform(format!(
                "rotation angle must be finite, got {}",
                theta
            )));
        }
        Ok(Transform::Rotate { theta })
    }

    /// Uniform vertex smearing. Widths must be finite and non-negative;
    /// a zero width disables that axis.
    pub fn uniform_smear(width_x: f64, width_y: f64, width_z: f64) -> Result<Self, ConfigError> {
        for (axis, value) in [("width_x", width_x), ("width_y", width_y), ("width_z", width_z)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTransform(format!(
                    "smear {} must be finite and non-negative, got {}",
                    axis, value
                )));
            }
        }
        Ok(Transform::UniformSmear {
            width_x,
            width_y,
            width_z,
        })
    }

    /// Apply this transform to every vertex (and, for rotations, every
    /// particle tree) of the event.
    pub fn apply(&self, event: &mut PrimaryEvent, rng: &mut RngManager) {
        match self {
            Transform::Translate { dx, dy, dz } => {
                for vertex in event.vertices_mut() {
                    vertex.translate(*dx, *dy, *dz);
                }
            }
            Transform::GaussianSmear {
                sigma_x,
                sigma_y,
                sigma_z,
            } => {
                // One shift per axis per application, shared by all vertices
                let dx = if *sigma_x > 0.0 {
                    sigma_x * rng.next_gaussian()
                } else {
                    0.0
                };
                let dy = if *sigma_y > 0.0 {
                    sigma_y * rng.next_gaussian()
                } else {
                    0.0
                };
                let dz = if *sigma_z > 0.0 {
                    sigma_z * rng.next_gaussian()
                } else {
                    0.0
                };
                for vertex in event.vertices_mut() {
                    vertex.translate(dx, dy, dz);
                }
            }
            Transform::Rotate { theta } => {
                let (sin, cos) = theta.sin_cos();
                for vertex in event.vertices_mut() {
                    let (x, y, z) = vertex.position();
                    vertex.set_position(x * cos + z * sin, y, z * cos - x * sin);
                    for particle in vertex.particles_mut() {
                        rotate_particle(particle, sin, cos);
                    }
                }
            }
            Transform::UniformSmear {
                width_x,
                width_y,
                width_z,
            } => {
                let dx = if *width_x > 0.0 {
                    (rng.next_f64() - 0.5) * width_x
                } else {
                    0.0
                };
                let dy = if *width_y > 0.0 {
                    (rng.next_f64() - 0.5) * width_y
                } else {
                    0.0
                };
                let dz = if *width_z > 0.0 {
                    (rng.next_f64() - 0.5) * width_z
                } else {
                    0.0
                };
                for vertex in event.vertices_mut() {
                    vertex.translate(dx, dy, dz);
                }
            }
        }
    }
}

/// Rotate a particle's momentum in the x-z plane and recurse into its
/// daughters.
fn rotate_particle(particle: &mut Particle, sin: f64, cos: f64) {
    let (px, py, pz) = particle.momentum();
    particle.set_momentum(px * cos + pz * sin, py, pz * cos - px * sin);
    for daughter in particle.daughters_mut() {
        rotate_particle(daughter, sin, cos);
    }
}

/// An ordered chain of transforms applied in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformChain {
    transforms: Vec<Transform>,
}

impl TransformChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transform to the end of the chain.
    pub fn add(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// Registered transforms, in application order
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Number of registered transforms
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// True if no transform is registered.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Apply all transforms to the event, in registration order.
    pub fn apply(&self, event: &mut PrimaryEvent, rng: &mut RngManager) {
        for transform in &self.transforms {
            transform.apply(event, rng);
        }
    }
}
