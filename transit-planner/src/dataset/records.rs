//! Raw record shapes of the dataset tables.
//!
//! These mirror the JSON files one-to-one. Deserialization enforces the
//! structural shape; semantic checks happen in [`super::Dataset::from_records`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Coord, DirectionCode, RouteIndex, StopCode};

/// A row of `stops.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub code: StopCode,

    /// Display names keyed by language code.
    #[serde(default)]
    pub names: BTreeMap<String, String>,

    /// `[lat, lon]`; absent or null for a handful of stops in real feeds.
    #[serde(default)]
    pub coords: Option<Coord>,

    /// Lines serving this stop.
    #[serde(default)]
    pub route_indexes: Vec<RouteIndex>,
}

/// A row of `routes.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub route_index: RouteIndex,

    /// Public line number, e.g. `"94"` or `"M2"`.
    pub route_ref: String,

    /// Transport type label (`metro`, `tram`, `trolley`, `bus`).
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A row of `directions.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionRecord {
    pub code: DirectionCode,
    pub stops: Vec<StopCode>,
}

/// A row of `trips.json`. The trip id is the row's position in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub route_index: RouteIndex,
    pub direction: DirectionCode,
    #[serde(default)]
    pub is_weekend: bool,
}

/// A row of `stop_times.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopTimeRecord {
    /// Position of the trip in `trips.json`.
    pub trip: u32,

    /// Minute-of-day per stop position of the trip's direction.
    pub times: Vec<Option<u32>>,
}
