//! The precomputed, searchable network.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DirectionCode, StopCode, TransportType};

/// Errors reading or writing a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A scheduled hop between two consecutive stops of a direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideEdge {
    pub from: StopCode,
    pub to: StopCode,
    pub direction: DirectionCode,
    pub transport: TransportType,
    pub travel_time_mins: f64,
    pub distance_m: f64,
}

/// A short walking transfer between nearby stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkEdge {
    pub from: StopCode,
    pub to: StopCode,
    pub distance_m: f64,

    /// Whether both stops carry what looks like the same name.
    pub is_name_similar: bool,
}

/// Adjacency (ride edges) and proximity (walk edges) indexes.
///
/// Read-only once built. A rebuild produces a whole new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSnapshot {
    pub generated_at: DateTime<Utc>,
    pub adjacency: BTreeMap<StopCode, Vec<RideEdge>>,

    /// Sorted ascending by distance per stop.
    pub proximity: BTreeMap<StopCode, Vec<WalkEdge>>,
}

impl NetworkSnapshot {
    /// An empty snapshot generated at `generated_at`.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            adjacency: BTreeMap::new(),
            proximity: BTreeMap::new(),
        }
    }

    /// Ride edges leaving `stop`.
    pub fn rides_from(&self, stop: StopCode) -> &[RideEdge] {
        self.adjacency.get(&stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Walk edges leaving `stop`, nearest first.
    pub fn walks_from(&self, stop: StopCode) -> &[WalkEdge] {
        self.proximity.get(&stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of ride edges.
    pub fn ride_edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Total number of walk edges.
    pub fn walk_edge_count(&self) -> usize {
        self.proximity.values().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the snapshot to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read a snapshot previously written by [`NetworkSnapshot::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
