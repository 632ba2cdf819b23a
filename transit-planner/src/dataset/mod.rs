//! The network dataset: stops, lines, directions, trips and stop times.
//!
//! The dataset is an immutable input feed. Loading decodes each table into
//! typed records and fails fast on structurally invalid files. Rows that
//! decode but cannot be used (dangling references, stops without
//! coordinates, degenerate directions) are skipped and reported in the log.

mod error;
mod records;

use std::collections::HashSet;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::{DirectionCode, RouteIndex, ServiceDay};

pub use error::DatasetError;
pub use records::{DirectionRecord, RouteRecord, StopRecord, StopTimeRecord, TripRecord};

/// File names of the dataset tables inside the data directory.
pub const STOPS_FILE: &str = "stops.json";
pub const ROUTES_FILE: &str = "routes.json";
pub const DIRECTIONS_FILE: &str = "directions.json";
pub const TRIPS_FILE: &str = "trips.json";
pub const STOP_TIMES_FILE: &str = "stop_times.json";

/// A scheduled run of a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    /// Position of the trip in the trips table.
    pub id: u32,
    pub route_index: RouteIndex,
    pub direction: DirectionCode,
    pub day: ServiceDay,
}

/// Scheduled minutes of one trip, aligned with its direction's stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimes {
    pub trip: u32,
    pub times: Vec<Option<u32>>,
}

/// Counts of rows dropped while validating the raw tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkippedRows {
    pub duplicate_stops: usize,
    pub stops_without_coords: usize,
    pub duplicate_routes: usize,
    pub short_directions: usize,
    pub duplicate_directions: usize,
    pub dangling_trips: usize,
    pub dangling_stop_times: usize,
}

impl SkippedRows {
    pub fn total(&self) -> usize {
        self.duplicate_stops
            + self.stops_without_coords
            + self.duplicate_routes
            + self.short_directions
            + self.duplicate_directions
            + self.dangling_trips
            + self.dangling_stop_times
    }
}

/// Validated network dataset.
///
/// Stops without coordinates are kept (their names are still useful for
/// display) but they never enter the graph indexes.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub stops: Vec<StopRecord>,
    pub routes: Vec<RouteRecord>,
    pub directions: Vec<DirectionRecord>,
    pub trips: Vec<Trip>,
    pub stop_times: Vec<StopTimes>,
    pub skipped: SkippedRows,
}

impl Dataset {
    /// Load and validate the five tables from `dir`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();

        let stops: Vec<StopRecord> = read_table(dir, STOPS_FILE)?;
        let routes: Vec<RouteRecord> = read_table(dir, ROUTES_FILE)?;
        let directions: Vec<DirectionRecord> = read_table(dir, DIRECTIONS_FILE)?;
        let trips: Vec<TripRecord> = read_table(dir, TRIPS_FILE)?;
        let stop_times: Vec<StopTimeRecord> = read_table(dir, STOP_TIMES_FILE)?;

        let dataset = Self::from_records(stops, routes, directions, trips, stop_times);
        info!(
            dir = %dir.display(),
            stops = dataset.stops.len(),
            routes = dataset.routes.len(),
            directions = dataset.directions.len(),
            trips = dataset.trips.len(),
            "loaded network dataset"
        );
        Ok(dataset)
    }

    /// Validate raw records, dropping rows that cannot be used.
    pub fn from_records(
        stops: Vec<StopRecord>,
        routes: Vec<RouteRecord>,
        directions: Vec<DirectionRecord>,
        trips: Vec<TripRecord>,
        stop_times: Vec<StopTimeRecord>,
    ) -> Self {
        let mut skipped = SkippedRows::default();

        let mut seen_stops = HashSet::new();
        let stops: Vec<StopRecord> = stops
            .into_iter()
            .filter_map(|mut stop| {
                if !seen_stops.insert(stop.code) {
                    debug!(stop = %stop.code, "skipping duplicate stop");
                    skipped.duplicate_stops += 1;
                    return None;
                }
                if stop.coords.is_some_and(|c| !c.is_valid()) {
                    stop.coords = None;
                }
                if stop.coords.is_none() {
                    debug!(stop = %stop.code, "stop has no usable coordinates");
                    skipped.stops_without_coords += 1;
                }
                Some(stop)
            })
            .collect();

        let mut seen_routes = HashSet::new();
        let routes: Vec<RouteRecord> = routes
            .into_iter()
            .filter(|route| {
                let fresh = seen_routes.insert(route.route_index);
                if !fresh {
                    debug!(route = %route.route_index, "skipping duplicate route");
                    skipped.duplicate_routes += 1;
                }
                fresh
            })
            .collect();

        let mut seen_directions = HashSet::new();
        let directions: Vec<DirectionRecord> = directions
            .into_iter()
            .filter(|dir| {
                if dir.stops.len() < 2 {
                    debug!(direction = %dir.code, "skipping direction with fewer than 2 stops");
                    skipped.short_directions += 1;
                    return false;
                }
                if !seen_directions.insert(dir.code) {
                    debug!(direction = %dir.code, "skipping duplicate direction");
                    skipped.duplicate_directions += 1;
                    return false;
                }
                true
            })
            .collect();

        let trips: Vec<Trip> = trips
            .into_iter()
            .enumerate()
            .filter_map(|(idx, trip)| {
                if !seen_directions.contains(&trip.direction)
                    || !seen_routes.contains(&trip.route_index)
                {
                    debug!(trip = idx, direction = %trip.direction, "skipping dangling trip");
                    skipped.dangling_trips += 1;
                    return None;
                }
                Some(Trip {
                    id: idx as u32,
                    route_index: trip.route_index,
                    direction: trip.direction,
                    day: ServiceDay::from_is_weekend(trip.is_weekend),
                })
            })
            .collect();

        let trip_ids: HashSet<u32> = trips.iter().map(|t| t.id).collect();
        let stop_times: Vec<StopTimes> = stop_times
            .into_iter()
            .filter_map(|st| {
                if !trip_ids.contains(&st.trip) {
                    debug!(trip = st.trip, "skipping stop times of unknown trip");
                    skipped.dangling_stop_times += 1;
                    return None;
                }
                Some(StopTimes {
                    trip: st.trip,
                    times: st.times,
                })
            })
            .collect();

        if skipped.total() > 0 {
            warn!(?skipped, "dataset contains rows that were skipped or degraded");
        }

        Self {
            stops,
            routes,
            directions,
            trips,
            stop_times,
            skipped,
        }
    }

    /// True when the dataset has no stops at all.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Read one JSON table from the data directory.
fn read_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<Vec<T>, DatasetError> {
    let file = dir.join(name);
    let json = std::fs::read_to_string(&file).map_err(|source| DatasetError::Io {
        file: file.clone(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| DatasetError::Json { file, source })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{Coord, StopCode};

    fn find_stop(ds: &Dataset, code: StopCode) -> Option<&StopRecord> {
        ds.stops.iter().find(|s| s.code == code)
    }

    fn stop(code: u32, coords: Option<(f64, f64)>) -> StopRecord {
        StopRecord {
            code: StopCode(code),
            names: BTreeMap::from([("bg".to_string(), format!("Stop {code}"))]),
            coords: coords.map(|(lat, lon)| Coord::new(lat, lon)),
            route_indexes: vec![],
        }
    }

    fn route(idx: u32, r: &str) -> RouteRecord {
        RouteRecord {
            route_index: RouteIndex(idx),
            route_ref: r.to_string(),
            kind: "bus".to_string(),
        }
    }

    fn direction(code: u32, stops: &[u32]) -> DirectionRecord {
        DirectionRecord {
            code: DirectionCode(code),
            stops: stops.iter().map(|s| StopCode(*s)).collect(),
        }
    }

    fn trip(route: u32, dir: u32) -> TripRecord {
        TripRecord {
            route_index: RouteIndex(route),
            direction: DirectionCode(dir),
            is_weekend: false,
        }
    }

    #[test]
    fn keeps_valid_rows() {
        let ds = Dataset::from_records(
            vec![stop(1, Some((42.0, 23.0))), stop(2, Some((42.01, 23.0)))],
            vec![route(0, "5")],
            vec![direction(10, &[1, 2])],
            vec![trip(0, 10)],
            vec![StopTimeRecord {
                trip: 0,
                times: vec![Some(480), Some(485)],
            }],
        );

        assert_eq!(ds.stops.len(), 2);
        assert_eq!(ds.directions.len(), 1);
        assert_eq!(ds.trips.len(), 1);
        assert_eq!(ds.trips[0].day, ServiceDay::Weekday);
        assert_eq!(ds.stop_times.len(), 1);
        assert_eq!(ds.skipped.total(), 0);
    }

    #[test]
    fn skips_unusable_rows() {
        let ds = Dataset::from_records(
            vec![
                stop(1, Some((42.0, 23.0))),
                stop(1, Some((43.0, 23.0))),
                stop(2, None),
                stop(3, Some((f64::NAN, 23.0))),
            ],
            vec![route(0, "5"), route(0, "6")],
            vec![direction(10, &[1, 2]), direction(11, &[1]), direction(10, &[2, 1])],
            vec![trip(0, 10), trip(0, 11), trip(9, 10)],
            vec![
                StopTimeRecord {
                    trip: 0,
                    times: vec![Some(480), None],
                },
                StopTimeRecord {
                    trip: 1,
                    times: vec![Some(480)],
                },
                StopTimeRecord {
                    trip: 7,
                    times: vec![],
                },
            ],
        );

        // Duplicate stop dropped; first one wins
        assert_eq!(ds.stops.len(), 3);
        assert_eq!(find_stop(&ds, StopCode(1)).unwrap().coords, Some(Coord::new(42.0, 23.0)));
        // Stops without usable coordinates are kept but counted
        assert!(find_stop(&ds, StopCode(2)).unwrap().coords.is_none());
        assert!(find_stop(&ds, StopCode(3)).unwrap().coords.is_none());
        assert_eq!(ds.skipped.stops_without_coords, 2);

        assert_eq!(ds.routes.len(), 1);
        assert_eq!(ds.routes[0].route_ref, "5");

        assert_eq!(ds.directions.len(), 1);
        assert_eq!(ds.skipped.short_directions, 1);
        assert_eq!(ds.skipped.duplicate_directions, 1);

        // Trip 1 references the short direction, trip 2 an unknown route
        assert_eq!(ds.trips.len(), 1);
        assert_eq!(ds.trips[0].id, 0);
        assert_eq!(ds.skipped.dangling_trips, 2);

        assert_eq!(ds.stop_times.len(), 1);
        assert_eq!(ds.skipped.dangling_stop_times, 2);
    }

    #[test]
    fn empty_dataset_is_not_an_error() {
        let ds = Dataset::from_records(vec![], vec![], vec![], vec![], vec![]);
        assert!(ds.is_empty());
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(STOPS_FILE),
            r#"[{"code": 1, "names": {"bg": "A"}, "coords": [42.7, 23.3]}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join(ROUTES_FILE),
            r#"[{"route_index": 0, "route_ref": "5", "type": "bus"}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join(DIRECTIONS_FILE), "[]").unwrap();
        std::fs::write(dir.path().join(TRIPS_FILE), "[]").unwrap();
        std::fs::write(dir.path().join(STOP_TIMES_FILE), "[]").unwrap();

        let ds = Dataset::load(dir.path()).unwrap();
        assert_eq!(ds.stops.len(), 1);
        assert_eq!(ds.routes.len(), 1);
    }

    #[test]
    fn load_fails_on_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(dir.path()).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn load_fails_on_malformed_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STOPS_FILE), r#"[{"code": "one"}]"#).unwrap();
        let err = Dataset::load(dir.path()).unwrap_err();
        match err {
            DatasetError::Json { file, .. } => assert!(file.ends_with(STOPS_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
