//! Composite event model
//!
//! `PrimaryEvent` doubles as the destination event the orchestrator fills
//! over a tick and as the disposable scratch event each draw builds into.
//! A scratch event inherits the destination's id so sampling policies that
//! key on the event sequence number see a consistent value.

use serde::{Deserialize, Serialize};

use super::vertex::Vertex;

/// A composite event: an id plus zero or more overlaid primary vertices.
///
/// # Example
/// ```
/// use overlay_engine_core_rs::{PrimaryEvent, Vertex};
///
/// let mut event = PrimaryEvent::new(7);
/// event.add_vertex(Vertex::new(0.0, 0.0, -4.3));
/// assert_eq!(event.vertex_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryEvent {
    /// Sequence id of the event within the run
    id: u64,

    /// Overlaid vertices, in the order sources produced them
    vertices: Vec<Vertex>,
}

impl PrimaryEvent {
    /// Create an empty event with the given sequence id.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            vertices: Vec::new(),
        }
    }

    /// Sequence id of this event
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Append a vertex. The caller clones when overlaying from a scratch
    /// event, so the destination owns an independent deep copy.
    pub fn add_vertex(&mut self, vertex: Vertex) {
        self.vertices.push(vertex);
    }

    /// All vertices
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Mutable access to all vertices (for transforms and status walks)
    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    /// First vertex, if any. Overlay copies only the first vertex of a
    /// scratch event into the destination.
    pub fn first_vertex(&self) -> Option<&Vertex> {
        self.vertices.first()
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// True if no vertex has been added.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_event() {
        let event = PrimaryEvent::new(3);
        assert_eq!(event.id(), 3);
        assert!(event.is_empty());
        assert!(event.first_vertex().is_none());
    }

    #[test]
    fn test_vertex_order_preserved() {
        let mut event = PrimaryEvent::new(0);
        event.add_vertex(Vertex::new(1.0, 0.0, 0.0));
        event.add_vertex(Vertex::new(2.0, 0.0, 0.0));

        assert_eq!(event.vertex_count(), 2);
        assert_eq!(event.vertices()[0].position().0, 1.0);
        assert_eq!(event.first_vertex().unwrap().position().0, 1.0);
    }
}
