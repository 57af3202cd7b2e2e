//! Domain models for the overlay engine.

pub mod event;
pub mod particle;
pub mod record;
pub mod vertex;
