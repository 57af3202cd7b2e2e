//! Orchestrator engine
//!
//! Main overlay loop integrating all components:
//! - Draw-count sampling per source (fixed, Poisson, periodic, cross section)
//! - The per-source read cycle, including transparent file-queue advances
//! - Transform application and vertex overlay into the destination event
//! - Generation-status assignment over the composited particle trees
//!
//! # Tick loop
//!
//! ```text
//! For each tick (one destination event):
//! 1. For each source, in registration order:
//!    a. Ask its sampling policy for the number of draws
//!    b. For each draw: advance the read-mode state machine, build a
//!       scratch event, apply the source's transforms, and overlay the
//!       scratch's first vertex if it carries at least one particle
//! 2. Walk every particle tree and assign generation status
//! ```
//!
//! # Determinism
//!
//! All randomness is via one `RngManager` with seeded xorshift64*, owned
//! here and lent to each source in turn. Same seed + same config =
//! identical results (deterministic replay), including shuffled read
//! orders across all sources.
//!
//! # Failure semantics
//!
//! End-of-file is recovered by advancing the source's file queue and
//! retrying the read exactly once. Everything else — end of data, a bad
//! record index, a malformed record — aborts the tick with an error naming
//! the offending source. A source silently running dry would corrupt the
//! statistical normalization of the run, so nothing is swallowed.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::event::PrimaryEvent;
use crate::models::particle::{GenStatus, Particle};
use crate::rng::RngManager;
use crate::source::{EventSource, ReadOutcome, SourceError};

/// Complete orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// RNG seed for deterministic runs
    pub rng_seed: u64,
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Destination event id
    pub event_id: u64,

    /// Total draws taken across all sources
    pub draws: usize,

    /// Vertices actually overlaid (empty draws are dropped)
    pub vertices_overlaid: usize,
}

/// Run-aborting errors surfaced by the orchestrator.
// Display/Error are implemented by hand: thiserror's derive treats any field
// named `source` as an error cause, but here `source` is the event-source name.
#[derive(Debug)]
pub enum SimulationError {
    InvalidConfig(String),

    DuplicateSource(String),

    Source(SourceError),

    EmptyFile { source: String },
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidConfig(msg) => write!(f, "Invalid config: {msg}"),
            SimulationError::DuplicateSource(name) => {
                write!(f, "Duplicate source name: {name}")
            }
            SimulationError::Source(err) => std::fmt::Display::fmt(err, f),
            SimulationError::EmptyFile { source } => {
                write!(f, "Failed to read first event from '{source}'")
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Source(err) => std::error::Error::source(err),
            _ => None,
        }
    }
}

impl From<SourceError> for SimulationError {
    fn from(err: SourceError) -> Self {
        SimulationError::Source(err)
    }
}

/// Main orchestrator owning the source list and the shared RNG.
///
/// # Example
///
/// ```rust,ignore
/// use overlay_engine_core_rs::{Orchestrator, OrchestratorConfig, PrimaryEvent};
///
/// let mut orchestrator = Orchestrator::new(OrchestratorConfig { rng_seed: 12345 });
/// orchestrator.add_source(beam)?;
/// orchestrator.initialize()?;
///
/// for id in 0..1000 {
///     let mut event = PrimaryEvent::new(id);
///     let result = orchestrator.generate(&mut event)?;
///     println!("Event {}: {} vertices", result.event_id, result.vertices_overlaid);
/// }
/// ```
pub struct Orchestrator {
    /// Registered sources, processed in registration order every tick
    sources: Vec<EventSource>,

    /// Deterministic RNG shared by all sources
    rng: RngManager,

    /// Set by `initialize`; `generate` refuses to run without it
    initialized: bool,
}

impl Orchestrator {
    /// Create a new orchestrator from configuration.
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            sources: Vec::new(),
            rng: RngManager::new(config.rng_seed),
            initialized: false,
        }
    }

    /// Register an event source. Names must be unique.
    pub fn add_source(&mut self, source: EventSource) -> Result<(), SimulationError> {
        if self.sources.iter().any(|s| s.name() == source.name()) {
            return Err(SimulationError::DuplicateSource(source.name().to_string()));
        }
        self.sources.push(source);
        Ok(())
    }

    /// Registered sources, in registration order
    pub fn sources(&self) -> &[EventSource] {
        &self.sources
    }

    /// Look up a source by name.
    pub fn source(&self, name: &str) -> Option<&EventSource> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Look up a source by name for mutation (e.g. the read flag).
    pub fn source_mut(&mut self, name: &str) -> Option<&mut EventSource> {
        self.sources.iter_mut().find(|s| s.name() == name)
    }

    /// Current RNG state (for checkpointing/replay)
    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    /// Initialize every source: queue its files, open the first one
    /// (building caches per its read mode), and run its sampling setup
    /// hook. Must be called once before the first `generate`.
    pub fn initialize(&mut self) -> Result<(), SimulationError> {
        let Self { sources, rng, .. } = self;
        for source in sources.iter_mut() {
            source.initialize(rng)?;
            debug!(source = %source.name(), "initialized event source");
        }
        self.initialized = true;
        Ok(())
    }

    /// Execute one tick: draw from every source and composite the results
    /// into the destination event, then assign generation status over the
    /// finished particle trees.
    pub fn generate(&mut self, dest: &mut PrimaryEvent) -> Result<TickResult, SimulationError> {
        if !self.initialized {
            return Err(SimulationError::InvalidConfig(
                "initialize() must be called before generate()".to_string(),
            ));
        }

        let Self { sources, rng, .. } = self;
        let mut draws = 0;
        let mut vertices_overlaid = 0;

        for source in sources.iter_mut() {
            let nevents = source.sample_count(dest.id(), rng);
            debug!(source = %source.name(), event_id = dest.id(), nevents, "sampling source");

            for draw in 0..nevents {
                draws += 1;
                Self::advance_source(source, rng)?;

                // Disposable scratch event for this draw
                let mut scratch = PrimaryEvent::new(dest.id());
                source.build_primaries(&mut scratch)?;

                // Only transform and overlay if something was generated
                if !scratch.is_empty() {
                    source.apply_transforms(&mut scratch, rng);
                    // One overlaid vertex per draw: the first vertex of the
                    // scratch event
                    if let Some(vertex) = scratch.first_vertex() {
                        dest.add_vertex(vertex.clone());
                        vertices_overlaid += 1;
                    }
                } else {
                    trace!(source = %source.name(), draw, "empty draw dropped");
                }
            }
        }

        Self::assign_gen_status(dest);

        Ok(TickResult {
            event_id: dest.id(),
            draws,
            vertices_overlaid,
        })
    }

    /// Run one read on a source, advancing the file queue and retrying
    /// exactly once when the open file is exhausted. A freshly opened file
    /// that yields nothing is fatal; an empty file queue propagates as
    /// `EndOfData`.
    fn advance_source(
        source: &mut EventSource,
        rng: &mut RngManager,
    ) -> Result<(), SimulationError> {
        match source.read_next(rng)? {
            ReadOutcome::Ready => Ok(()),
            ReadOutcome::FileExhausted => {
                debug!(source = %source.name(), "file exhausted, advancing file queue");
                source.read_next_file(rng)?;
                match source.read_next(rng)? {
                    ReadOutcome::Ready => Ok(()),
                    ReadOutcome::FileExhausted => Err(SimulationError::EmptyFile {
                        source: source.name().to_string(),
                    }),
                }
            }
        }
    }

    /// Walk every particle tree in the destination event and stamp
    /// generation status: daughters present means intermediate, none means
    /// final state.
    fn assign_gen_status(event: &mut PrimaryEvent) {
        for vertex in event.vertices_mut() {
            for particle in vertex.particles_mut() {
                Self::assign_particle_status(particle);
            }
        }
    }

    fn assign_particle_status(particle: &mut Particle) {
        if particle.has_daughters() {
            particle.set_gen_status(GenStatus::Intermediate);
            for daughter in particle.daughters_mut() {
                Self::assign_particle_status(daughter);
            }
        } else {
            particle.set_gen_status(GenStatus::FinalState);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{EventRecord, TrackRecord};
    use crate::reader::InMemoryReader;

    fn one_track_source(name: &str, count: usize) -> EventSource {
        let mut reader = InMemoryReader::new();
        let records: Vec<EventRecord> = (0..count)
            .map(|i| {
                EventRecord::new(vec![TrackRecord::root(
                    11,
                    0.0,
                    0.0,
                    i as f64,
                    i as f64,
                    0.0,
                    0.0,
                    0.0,
                )])
            })
            .collect();
        reader.add_file("mem", records);
        let mut source = EventSource::new(name, Box::new(reader));
        source.add_file("mem");
        source
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let mut orchestrator = Orchestrator::new(OrchestratorConfig { rng_seed: 1 });
        orchestrator.add_source(one_track_source("beam", 1)).unwrap();
        let err = orchestrator
            .add_source(one_track_source("beam", 1))
            .unwrap_err();
        assert!(matches!(err, SimulationError::DuplicateSource(_)));
    }

    #[test]
    fn test_generate_before_initialize_fails() {
        let mut orchestrator = Orchestrator::new(OrchestratorConfig { rng_seed: 1 });
        let mut event = PrimaryEvent::new(0);
        let err = orchestrator.generate(&mut event).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidConfig(_)));
    }

    #[test]
    fn test_single_source_single_draw() {
        let mut orchestrator = Orchestrator::new(OrchestratorConfig { rng_seed: 1 });
        orchestrator.add_source(one_track_source("beam", 5)).unwrap();
        orchestrator.initialize().unwrap();

        let mut event = PrimaryEvent::new(0);
        let result = orchestrator.generate(&mut event).unwrap();
        assert_eq!(result.draws, 1);
        assert_eq!(result.vertices_overlaid, 1);
        assert_eq!(event.vertex_count(), 1);
    }

    #[test]
    fn test_gen_status_assignment() {
        let mut reader = InMemoryReader::new();
        reader.add_file(
            "mem",
            vec![EventRecord::new(vec![
                TrackRecord::root(22, 0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 0.0),
                TrackRecord::daughter(11, 0.0, 0.0, 1.0, 1.0, 0),
                TrackRecord::daughter(-11, 0.0, 0.0, 1.0, 1.0, 0),
            ])],
        );
        let mut source = EventSource::new("conv", Box::new(reader));
        source.add_file("mem");

        let mut orchestrator = Orchestrator::new(OrchestratorConfig { rng_seed: 1 });
        orchestrator.add_source(source).unwrap();
        orchestrator.initialize().unwrap();

        let mut event = PrimaryEvent::new(0);
        orchestrator.generate(&mut event).unwrap();

        let photon = &event.vertices()[0].particles()[0];
        assert_eq!(photon.gen_status(), GenStatus::Intermediate);
        for daughter in photon.daughters() {
            assert_eq!(daughter.gen_status(), GenStatus::FinalState);
        }
    }

    #[test]
    fn test_sources_processed_in_registration_order() {
        let mut orchestrator = Orchestrator::new(OrchestratorConfig { rng_seed: 1 });
        orchestrator.add_source(one_track_source("first", 3)).unwrap();
        orchestrator.add_source(one_track_source("second", 3)).unwrap();
        orchestrator.initialize().unwrap();

        // "first" reads record 0 (pz 0.0), "second" reads record 0 too;
        // vertex order in the destination mirrors registration order
        let mut event = PrimaryEvent::new(0);
        let result = orchestrator.generate(&mut event).unwrap();
        assert_eq!(result.draws, 2);
        assert_eq!(event.vertex_count(), 2);
        assert_eq!(
            orchestrator.sources()[0].name(),
            "first",
            "registration order must be preserved"
        );
    }
}
