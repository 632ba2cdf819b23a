//! Immutable lookup index over the dataset.
//!
//! Built once from a [`Dataset`] and passed by reference to the builder,
//! the planner and the itinerary composer. Nothing in here is mutated after
//! construction.

use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::Dataset;
use crate::domain::{Coord, DirectionCode, RouteIndex, StopCode, TransportType};

/// Language used for display names when available.
pub const PRIMARY_LANGUAGE: &str = "bg";

/// A stop as seen by the planner.
#[derive(Debug, Clone, PartialEq)]
pub struct StopInfo {
    pub code: StopCode,
    pub name: String,
    pub coords: Option<Coord>,
    pub route_indexes: Vec<RouteIndex>,
}

/// The public line a direction belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineInfo {
    pub route_index: Option<RouteIndex>,
    pub route_ref: String,
    pub transport: TransportType,
}

/// A direction's stop order plus its owning line.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionInfo {
    pub code: DirectionCode,
    pub stops: Vec<StopCode>,
    pub line: LineInfo,
}

impl DirectionInfo {
    /// Position of `stop` in this direction (first occurrence).
    pub fn position(&self, stop: StopCode) -> Option<usize> {
        self.stops.iter().position(|s| *s == stop)
    }
}

/// A public line and the directions its trips run on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub route_index: RouteIndex,
    pub route_ref: String,
    pub transport: TransportType,
    /// Directions in order of their first trip.
    pub directions: Vec<DirectionCode>,
}

/// A stop search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopMatch {
    pub code: StopCode,
    pub name: String,
}

/// Lookup tables derived from the dataset.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Stops in dataset order.
    stops: Vec<StopInfo>,
    stop_index: HashMap<StopCode, usize>,
    /// Directions in dataset order.
    directions: Vec<DirectionInfo>,
    direction_index: HashMap<DirectionCode, usize>,
    /// Lines in dataset order.
    lines: Vec<Line>,
    line_index: HashMap<RouteIndex, usize>,
}

impl Catalog {
    /// Build the catalog from a validated dataset.
    pub fn new(dataset: &Dataset) -> Self {
        let stops: Vec<StopInfo> = dataset
            .stops
            .iter()
            .map(|s| StopInfo {
                code: s.code,
                name: display_name(s.code, &s.names),
                coords: s.coords,
                route_indexes: s.route_indexes.clone(),
            })
            .collect();
        let stop_index = stops.iter().enumerate().map(|(i, s)| (s.code, i)).collect();

        let routes: HashMap<RouteIndex, _> =
            dataset.routes.iter().map(|r| (r.route_index, r)).collect();

        // The owning line of a direction is the route of its first trip
        let mut owners: HashMap<DirectionCode, RouteIndex> = HashMap::new();
        for trip in &dataset.trips {
            owners.entry(trip.direction).or_insert(trip.route_index);
        }

        let directions: Vec<DirectionInfo> = dataset
            .directions
            .iter()
            .map(|d| {
                let line = owners
                    .get(&d.code)
                    .and_then(|idx| routes.get(idx))
                    .map(|r| LineInfo {
                        route_index: Some(r.route_index),
                        route_ref: r.route_ref.clone(),
                        transport: TransportType::from_label(&r.kind),
                    })
                    .unwrap_or_else(|| LineInfo {
                        route_index: None,
                        route_ref: d.code.to_string(),
                        transport: TransportType::Bus,
                    });
                DirectionInfo {
                    code: d.code,
                    stops: d.stops.clone(),
                    line,
                }
            })
            .collect();
        let direction_index = directions
            .iter()
            .enumerate()
            .map(|(i, d)| (d.code, i))
            .collect();

        let mut lines: Vec<Line> = dataset
            .routes
            .iter()
            .map(|r| Line {
                route_index: r.route_index,
                route_ref: r.route_ref.clone(),
                transport: TransportType::from_label(&r.kind),
                directions: Vec::new(),
            })
            .collect();
        let line_index: HashMap<RouteIndex, usize> = lines
            .iter()
            .enumerate()
            .map(|(i, l)| (l.route_index, i))
            .collect();
        for trip in &dataset.trips {
            if let Some(&i) = line_index.get(&trip.route_index) {
                let served = &mut lines[i].directions;
                if !served.contains(&trip.direction) {
                    served.push(trip.direction);
                }
            }
        }

        Self {
            stops,
            stop_index,
            directions,
            direction_index,
            lines,
            line_index,
        }
    }

    pub fn stop(&self, code: StopCode) -> Option<&StopInfo> {
        self.stop_index.get(&code).map(|&i| &self.stops[i])
    }

    pub fn contains_stop(&self, code: StopCode) -> bool {
        self.stop_index.contains_key(&code)
    }

    pub fn stops(&self) -> &[StopInfo] {
        &self.stops
    }

    pub fn direction(&self, code: DirectionCode) -> Option<&DirectionInfo> {
        self.direction_index.get(&code).map(|&i| &self.directions[i])
    }

    pub fn directions(&self) -> &[DirectionInfo] {
        &self.directions
    }

    /// Line information for a direction.
    ///
    /// Unknown directions resolve to a bus line named after the code.
    pub fn line(&self, code: DirectionCode) -> LineInfo {
        self.direction(code)
            .map(|d| d.line.clone())
            .unwrap_or_else(|| LineInfo {
                route_index: None,
                route_ref: code.to_string(),
                transport: TransportType::Bus,
            })
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The line with the public reference `route_ref`; the first one wins
    /// when a reference is reused.
    pub fn line_by_ref(&self, route_ref: &str) -> Option<&Line> {
        let route_ref = route_ref.trim();
        self.lines.iter().find(|l| l.route_ref == route_ref)
    }

    /// Lines the dataset lists as serving `stop`.
    pub fn lines_at(&self, stop: StopCode) -> Vec<&Line> {
        let Some(info) = self.stop(stop) else {
            return Vec::new();
        };
        let mut lines: Vec<&Line> = Vec::new();
        for idx in &info.route_indexes {
            if let Some(&i) = self.line_index.get(idx) {
                if !lines.iter().any(|l| l.route_index == *idx) {
                    lines.push(&self.lines[i]);
                }
            }
        }
        lines
    }

    /// `First stop - Last stop` label of a direction.
    pub fn direction_label(&self, code: DirectionCode) -> String {
        match self.direction(code).map(|d| (d.stops.first(), d.stops.last())) {
            Some((Some(first), Some(last))) => {
                format!("{} - {}", self.stop_name(*first), self.stop_name(*last))
            }
            _ => format!("Direction {code}"),
        }
    }

    /// Display name of a stop, or `Stop <code>` when it is unknown.
    pub fn stop_name(&self, code: StopCode) -> String {
        self.stop(code)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("Stop {code}"))
    }

    /// Case-insensitive search over stop names and codes.
    ///
    /// Prefix matches come first, then by name and code.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<StopMatch> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(bool, &StopInfo)> = self
            .stops
            .iter()
            .filter_map(|s| {
                let name = s.name.to_lowercase();
                let code = s.code.to_string();
                if name.starts_with(&needle) || code == needle {
                    Some((true, s))
                } else if name.contains(&needle) || code.starts_with(&needle) {
                    Some((false, s))
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|(pa, a), (pb, b)| {
            pb.cmp(pa)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.code.cmp(&b.code))
        });

        hits.into_iter()
            .take(limit)
            .map(|(_, s)| StopMatch {
                code: s.code,
                name: s.name.clone(),
            })
            .collect()
    }
}

fn display_name(code: StopCode, names: &std::collections::BTreeMap<String, String>) -> String {
    names
        .get(PRIMARY_LANGUAGE)
        .or_else(|| names.values().next())
        .filter(|n| !n.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| format!("Stop {code}"))
}
