//! On-disk event record model
//!
//! An `EventRecord` is what a file reader hands back: a flat list of tracks
//! with parent links, plus a record-level weight. Sources resolve the flat
//! list into owned particle trees when building primaries. Tracks must be
//! ordered parent-before-daughter; a parent index at or past the track's own
//! position is a malformed record and is rejected as fatal.

use serde::{Deserialize, Serialize};

/// One generated track in its flat on-disk form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// PDG particle code
    pub pdg_id: i32,

    /// Momentum components (GeV)
    pub px: f64,
    pub py: f64,
    pub pz: f64,

    /// Total energy (GeV)
    pub energy: f64,

    /// Production position (mm); only meaningful for parentless tracks,
    /// which seed a vertex at this position
    pub x: f64,
    pub y: f64,
    pub z: f64,

    /// Index of the parent track, or None for a vertex-seeding track
    #[serde(default)]
    pub parent: Option<usize>,
}

/// One complete pre-generated event as read from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Flat track list, parents before daughters
    pub tracks: Vec<TrackRecord>,

    /// Record-level statistical weight
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl EventRecord {
    /// Create a record with the given tracks and weight 1.0.
    pub fn new(tracks: Vec<TrackRecord>) -> Self {
        Self {
            tracks,
            weight: 1.0,
        }
    }
}

impl TrackRecord {
    /// Create a parentless track that seeds a vertex at the given position.
    pub fn root(pdg_id: i32, px: f64, py: f64, pz: f64, energy: f64, x: f64, y: f64, z: f64) -> Self {
        Self {
            pdg_id,
            px,
            py,
            pz,
            energy,
            x,
            y,
            z,
            parent: None,
        }
    }

    /// Create a daughter track attached to the track at `parent`.
    pub fn daughter(pdg_id: i32, px: f64, py: f64, pz: f64, energy: f64, parent: usize) -> Self {
        Self {
            pdg_id,
            px,
            py,
            pz,
            energy,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            parent: Some(parent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_round_trip() {
        let record = EventRecord::new(vec![
            TrackRecord::root(11, 0.0, 0.0, 2.3, 2.3, 0.0, 0.0, -5.0),
            TrackRecord::daughter(22, 0.0, 0.0, 1.0, 1.0, 0),
        ]);

        let json = serde_json::to_string(&record).unwrap();
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_weight_defaults_to_one() {
        let json = r#"{"tracks":[]}"#;
        let record: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.weight, 1.0);
    }
}
