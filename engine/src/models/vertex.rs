//! Primary vertex model
//!
//! A vertex carries a position, a statistical weight, and the top-level
//! particles produced there. Weights are per-vertex and are never combined
//! across the vertices of a composite event: downstream consumers must track
//! weight vertex-by-vertex unless a run guarantees exactly one source.

use serde::{Deserialize, Serialize};

use super::particle::Particle;

/// A primary vertex with position, weight, and top-level particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Position components (mm)
    x: f64,
    y: f64,
    z: f64,

    /// Statistical weight; 1.0 unless a source applies a rarity correction
    weight: f64,

    /// Top-level particles attached to this vertex
    particles: Vec<Particle>,
}

impl Vertex {
    /// Create a vertex at the given position with weight 1.0 and no particles.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            weight: 1.0,
            particles: Vec::new(),
        }
    }

    /// Position components (x, y, z)
    pub fn position(&self) -> (f64, f64, f64) {
        (self.x, self.y, self.z)
    }

    /// Replace the position.
    pub fn set_position(&mut self, x: f64, y: f64, z: f64) {
        self.x = x;
        self.y = y;
        self.z = z;
    }

    /// Shift the position by the given offsets.
    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    /// Statistical weight of this vertex
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Set the statistical weight.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Attach a top-level particle.
    pub fn add_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Top-level particles
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to top-level particles (for transforms and status walks)
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of top-level particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_vertex_defaults() {
        let v = Vertex::new(1.0, 2.0, 3.0);
        assert_eq!(v.position(), (1.0, 2.0, 3.0));
        assert_eq!(v.weight(), 1.0);
        assert_eq!(v.particle_count(), 0);
    }

    #[test]
    fn test_translate() {
        let mut v = Vertex::new(1.0, 2.0, 3.0);
        v.translate(-1.0, 0.5, 10.0);
        assert_eq!(v.position(), (0.0, 2.5, 13.0));
    }

    #[test]
    fn test_weight_is_independent_per_vertex() {
        let mut a = Vertex::new(0.0, 0.0, 0.0);
        let b = Vertex::new(0.0, 0.0, 0.0);
        a.set_weight(0.25);
        assert_eq!(a.weight(), 0.25);
        assert_eq!(b.weight(), 1.0);
    }
}
