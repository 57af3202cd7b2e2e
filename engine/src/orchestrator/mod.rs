//! Orchestrator - main overlay loop
//!
//! Drives every registered event source once per tick and composites the
//! results into a single destination event.
//!
//! See `engine.rs` for full implementation.

pub mod engine;

// Re-export main types for convenience
pub use engine::{Orchestrator, OrchestratorConfig, SimulationError, TickResult};
