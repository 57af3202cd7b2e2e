//! Primary particle model
//!
//! A particle is a node in an owned tree: each particle carries its daughters
//! directly, so a vertex's particle content is a forest of small trees that
//! is created and destroyed once per tick. Transforms and status assignment
//! walk these trees recursively.

use serde::{Deserialize, Serialize};

/// Generation status assigned after all sources have been overlaid.
///
/// Particles with at least one daughter are intermediate; particles with
/// none are final state. Status starts as `Unset` and is stamped by the
/// orchestrator at the end of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenStatus {
    /// Not yet assigned (fresh from a source)
    Unset,

    /// No daughters; enters the downstream simulation as-is
    FinalState,

    /// Has daughters; only its decay products are simulated
    Intermediate,
}

impl Default for GenStatus {
    fn default() -> Self {
        GenStatus::Unset
    }
}

/// A generated primary particle with momentum and an owned daughter tree.
///
/// # Example
/// ```
/// use overlay_engine_core_rs::Particle;
///
/// let mut electron = Particle::new(11, 0.0, 0.0, 2.3, 2.3);
/// electron.add_daughter(Particle::new(22, 0.0, 0.0, 1.1, 1.1));
/// assert!(electron.has_daughters());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// PDG particle code
    pdg_id: i32,

    /// Momentum components (GeV)
    px: f64,
    py: f64,
    pz: f64,

    /// Total energy (GeV)
    energy: f64,

    /// Generation status, assigned by the orchestrator after overlay
    gen_status: GenStatus,

    /// Daughter particles (owned tree)
    daughters: Vec<Particle>,
}

impl Particle {
    /// Create a new particle with no daughters and unset generation status.
    pub fn new(pdg_id: i32, px: f64, py: f64, pz: f64, energy: f64) -> Self {
        Self {
            pdg_id,
            px,
            py,
            pz,
            energy,
            gen_status: GenStatus::Unset,
            daughters: Vec::new(),
        }
    }

    /// PDG particle code
    pub fn pdg_id(&self) -> i32 {
        self.pdg_id
    }

    /// Momentum components (px, py, pz)
    pub fn momentum(&self) -> (f64, f64, f64) {
        (self.px, self.py, self.pz)
    }

    /// Replace the momentum components.
    ///
    /// Used by geometric transforms; energy is left untouched because the
    /// transforms in this engine preserve |p|.
    pub fn set_momentum(&mut self, px: f64, py: f64, pz: f64) {
        self.px = px;
        self.py = py;
        self.pz = pz;
    }

    /// Total energy
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Current generation status
    pub fn gen_status(&self) -> GenStatus {
        self.gen_status
    }

    /// Set the generation status
    pub fn set_gen_status(&mut self, status: GenStatus) {
        self.gen_status = status;
    }

    /// Append a daughter particle.
    pub fn add_daughter(&mut self, daughter: Particle) {
        self.daughters.push(daughter);
    }

    /// Daughter particles
    pub fn daughters(&self) -> &[Particle] {
        &self.daughters
    }

    /// Mutable access to daughter particles (for recursive walks)
    pub fn daughters_mut(&mut self) -> &mut [Particle] {
        &mut self.daughters
    }

    /// True if this particle has at least one daughter.
    pub fn has_daughters(&self) -> bool {
        !self.daughters.is_empty()
    }
}
