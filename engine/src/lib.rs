//! Overlay Engine Core - Rust Engine
//!
//! Event-source orchestration and sampling engine with deterministic execution.
//! Once per simulated tick, the engine decides how many pre-generated events to
//! draw from each configured source, in what order to read them from disk, how
//! to geometrically transform them, and how to overlay the results into a
//! single composite output event.
//!
//! # Architecture
//!
//! - **models**: Domain types (Particle, Vertex, PrimaryEvent, EventRecord)
//! - **sampling**: Per-source sampling policies (fixed, Poisson, periodic, cross section)
//! - **transform**: Geometric transform chains (translate, smear, rotate)
//! - **reader**: Per-format event file readers behind a narrow trait
//! - **source**: Event sources with file queues and read-mode state machines
//! - **orchestrator**: Main per-tick overlay loop
//! - **rng**: Deterministic random number generation
//! - **config**: Serializable configuration structs and validation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (one seeded RNG shared by all sources)
//! 2. End-of-file is a value, not an error; end-of-data is fatal
//! 3. Per-vertex weights are never combined across overlaid vertices

// Module declarations
pub mod config;
pub mod models;
pub mod orchestrator;
pub mod reader;
pub mod rng;
pub mod sampling;
pub mod source;
pub mod transform;

// Re-exports for convenience
pub use config::{ConfigError, SamplingConfig, SourceConfig, TransformConfig};
pub use models::{
    event::PrimaryEvent,
    particle::{GenStatus, Particle},
    record::{EventRecord, TrackRecord},
    vertex::Vertex,
};
pub use orchestrator::{Orchestrator, OrchestratorConfig, SimulationError, TickResult};
pub use reader::{EventReader, InMemoryReader, JsonLinesReader, ReaderError};
pub use rng::RngManager;
pub use sampling::{LuminosityConstants, SamplingPolicy};
pub use source::{EventSource, ReadMode, ReadOutcome, SourceError, SEMI_RANDOM_BLOCK_SIZE};
pub use transform::{Transform, TransformChain};
