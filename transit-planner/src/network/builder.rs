//! Offline precomputation of the network snapshot.
//!
//! Two indexes are derived from the catalog:
//! - adjacency: for every consecutive stop pair of every direction, a ride
//!   edge in the nominal order and its reverse, with the travel time
//!   estimated from the great-circle distance and the line's mode speed;
//! - proximity: for every stop, the nearest other stops within walking
//!   radius, nearest first and capped in number.
//!
//! The output depends only on the input data (plus the generation
//! timestamp), so identical input produces an identical snapshot.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::catalog::{Catalog, StopInfo};
use crate::domain::{Coord, StopCode, names_similar};

use super::snapshot::{NetworkSnapshot, RideEdge, WalkEdge};

/// Parameters of the precomputation.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Maximum distance of a walking transfer, in metres.
    pub walk_radius_m: f64,

    /// Maximum number of walk edges kept per stop.
    pub max_walk_neighbours: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            walk_radius_m: 400.0,
            max_walk_neighbours: 5,
        }
    }
}

/// Build a snapshot stamped with the current time.
pub fn build(catalog: &Catalog, config: &BuildConfig) -> NetworkSnapshot {
    build_at(catalog, config, Utc::now())
}

/// Build a snapshot with an explicit generation timestamp.
pub fn build_at(
    catalog: &Catalog,
    config: &BuildConfig,
    generated_at: DateTime<Utc>,
) -> NetworkSnapshot {
    let adjacency = build_adjacency(catalog);
    let proximity = build_proximity(catalog, config);

    let snapshot = NetworkSnapshot {
        generated_at,
        adjacency,
        proximity,
    };

    info!(
        stops = catalog.stops().len(),
        ride_edges = snapshot.ride_edge_count(),
        walk_edges = snapshot.walk_edge_count(),
        "built network snapshot"
    );

    snapshot
}

fn coords_of(catalog: &Catalog, stop: StopCode) -> Option<Coord> {
    catalog.stop(stop).and_then(|s| s.coords)
}

fn build_adjacency(catalog: &Catalog) -> BTreeMap<StopCode, Vec<RideEdge>> {
    let mut adjacency: BTreeMap<StopCode, Vec<RideEdge>> = BTreeMap::new();
    let mut emitted = HashSet::new();

    for direction in catalog.directions() {
        let transport = direction.line.transport;

        for pair in direction.stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);

            let (Some(a), Some(b)) = (coords_of(catalog, from), coords_of(catalog, to)) else {
                debug!(
                    direction = %direction.code,
                    %from,
                    %to,
                    "skipping hop with a stop lacking coordinates"
                );
                continue;
            };

            let distance_m = a.distance_m(&b);
            let travel_time_mins = transport.travel_minutes(distance_m);

            for (f, t) in [(from, to), (to, from)] {
                if !emitted.insert((f, t, direction.code)) {
                    continue;
                }
                adjacency.entry(f).or_default().push(RideEdge {
                    from: f,
                    to: t,
                    direction: direction.code,
                    transport,
                    travel_time_mins,
                    distance_m,
                });
            }
        }
    }

    adjacency
}

fn build_proximity(catalog: &Catalog, config: &BuildConfig) -> BTreeMap<StopCode, Vec<WalkEdge>> {
    let located: Vec<(&StopInfo, Coord)> = catalog
        .stops()
        .iter()
        .filter_map(|s| s.coords.map(|c| (s, c)))
        .collect();

    let mut proximity = BTreeMap::new();

    for (stop, coords) in &located {
        let mut nearby: Vec<WalkEdge> = located
            .iter()
            .filter(|(other, _)| other.code != stop.code)
            .filter_map(|(other, other_coords)| {
                let distance_m = coords.distance_m(other_coords);
                (distance_m <= config.walk_radius_m).then(|| WalkEdge {
                    from: stop.code,
                    to: other.code,
                    distance_m,
                    is_name_similar: names_similar(&stop.name, &other.name),
                })
            })
            .collect();

        // Stable sort: equal distances keep dataset order
        nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        nearby.truncate(config.max_walk_neighbours);

        proximity.insert(stop.code, nearby);
    }

    proximity
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;
    use crate::dataset::{Dataset, DirectionRecord, RouteRecord, StopRecord, TripRecord};
    use crate::domain::{DirectionCode, RouteIndex, TransportType};

    fn stop(code: u32, name: &str, coords: Option<(f64, f64)>) -> StopRecord {
        StopRecord {
            code: StopCode(code),
            names: BTreeMap::from([("bg".to_string(), name.to_string())]),
            coords: coords.map(|(lat, lon)| Coord::new(lat, lon)),
            route_indexes: vec![],
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Three stops on a north-south line, ~1.1 km apart, operated by a tram.
    fn line_catalog() -> Catalog {
        let ds = Dataset::from_records(
            vec![
                stop(1, "A", Some((42.70, 23.30))),
                stop(2, "B", Some((42.71, 23.30))),
                stop(3, "C", Some((42.72, 23.30))),
            ],
            vec![RouteRecord {
                route_index: RouteIndex(0),
                route_ref: "7".to_string(),
                kind: "tram".to_string(),
            }],
            vec![DirectionRecord {
                code: DirectionCode(10),
                stops: vec![StopCode(1), StopCode(2), StopCode(3)],
            }],
            vec![TripRecord {
                route_index: RouteIndex(0),
                direction: DirectionCode(10),
                is_weekend: false,
            }],
            vec![],
        );
        Catalog::new(&ds)
    }

    #[test]
    fn ride_edges_in_both_orders() {
        let snapshot = build_at(&line_catalog(), &BuildConfig::default(), fixed_time());

        let from_1 = snapshot.rides_from(StopCode(1));
        assert_eq!(from_1.len(), 1);
        assert_eq!(from_1[0].to, StopCode(2));
        assert_eq!(from_1[0].transport, TransportType::Tram);

        let from_2: Vec<StopCode> = snapshot.rides_from(StopCode(2)).iter().map(|e| e.to).collect();
        assert_eq!(from_2, vec![StopCode(1), StopCode(3)]);

        let forward = &snapshot.rides_from(StopCode(1))[0];
        let reverse = snapshot
            .rides_from(StopCode(2))
            .iter()
            .find(|e| e.to == StopCode(1))
            .unwrap();
        assert_eq!(forward.travel_time_mins, reverse.travel_time_mins);
        assert_eq!(forward.distance_m, reverse.distance_m);
        assert_eq!(forward.direction, reverse.direction);
    }

    #[test]
    fn travel_time_uses_mode_speed() {
        let snapshot = build_at(&line_catalog(), &BuildConfig::default(), fixed_time());
        let edge = &snapshot.rides_from(StopCode(1))[0];
        // ~1112 m at 25 km/h
        let expected = edge.distance_m / 1000.0 / 25.0 * 60.0;
        assert!((edge.travel_time_mins - expected).abs() < 1e-12);
        assert!((edge.travel_time_mins - 2.67).abs() < 0.01);
    }

    #[test]
    fn stops_far_apart_have_no_walk_edges() {
        let snapshot = build_at(&line_catalog(), &BuildConfig::default(), fixed_time());
        assert!(snapshot.walks_from(StopCode(1)).is_empty());
        assert_eq!(snapshot.walk_edge_count(), 0);
    }

    #[test]
    fn proximity_is_sorted_capped_and_flags_names() {
        // Stop 1 in the middle, seven neighbours at increasing distance
        let mut stops = vec![stop(1, "Serdika", Some((42.7000, 23.3000)))];
        for i in 0..7u32 {
            let name = if i == 3 { "Metro Station Serdika" } else { "Other" };
            let lat = 42.7000 + 0.0003 * f64::from(i + 1); // ~33 m steps
            stops.push(stop(10 + i, name, Some((lat, 23.3000))));
        }
        // Just beyond the radius
        stops.push(stop(99, "Far", Some((42.7040, 23.3000))));

        let ds = Dataset::from_records(stops, vec![], vec![], vec![], vec![]);
        let snapshot = build_at(&Catalog::new(&ds), &BuildConfig::default(), fixed_time());

        let near = snapshot.walks_from(StopCode(1));
        assert_eq!(near.len(), 5);
        let targets: Vec<StopCode> = near.iter().map(|w| w.to).collect();
        assert_eq!(
            targets,
            vec![StopCode(10), StopCode(11), StopCode(12), StopCode(13), StopCode(14)]
        );
        assert!(near.windows(2).all(|w| w[0].distance_m <= w[1].distance_m));
        assert!(near.iter().all(|w| w.distance_m <= 400.0));
        assert!(near[3].is_name_similar);
        assert!(!near[0].is_name_similar);
    }

    #[test]
    fn stop_without_coords_is_left_out() {
        let ds = Dataset::from_records(
            vec![
                stop(1, "A", Some((42.70, 23.30))),
                stop(2, "B", None),
                stop(3, "C", Some((42.7001, 23.30))),
            ],
            vec![],
            vec![DirectionRecord {
                code: DirectionCode(10),
                stops: vec![StopCode(1), StopCode(2), StopCode(3)],
            }],
            vec![],
            vec![],
        );
        let snapshot = build_at(&Catalog::new(&ds), &BuildConfig::default(), fixed_time());

        assert!(!snapshot.adjacency.contains_key(&StopCode(2)));
        assert!(!snapshot.proximity.contains_key(&StopCode(2)));
        assert!(snapshot.rides_from(StopCode(1)).is_empty());
        assert_eq!(snapshot.walks_from(StopCode(1))[0].to, StopCode(3));
    }

    #[test]
    fn empty_dataset_gives_empty_snapshot() {
        let ds = Dataset::default();
        let snapshot = build_at(&Catalog::new(&ds), &BuildConfig::default(), fixed_time());
        assert!(snapshot.adjacency.is_empty());
        assert!(snapshot.proximity.is_empty());
    }

    #[test]
    fn duplicate_hops_are_emitted_once() {
        let ds = Dataset::from_records(
            vec![stop(1, "A", Some((42.70, 23.30))), stop(2, "B", Some((42.71, 23.30)))],
            vec![],
            vec![DirectionRecord {
                code: DirectionCode(10),
                stops: vec![StopCode(1), StopCode(2), StopCode(1)],
            }],
            vec![],
            vec![],
        );
        let snapshot = build_at(&Catalog::new(&ds), &BuildConfig::default(), fixed_time());
        assert_eq!(snapshot.rides_from(StopCode(1)).len(), 1);
        assert_eq!(snapshot.rides_from(StopCode(2)).len(), 1);
    }

    #[test]
    fn rebuild_is_byte_identical() {
        let catalog = line_catalog();
        let a = build_at(&catalog, &BuildConfig::default(), fixed_time());
        let b = build_at(&catalog, &BuildConfig::default(), fixed_time());
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    const KINDS: [&str; 4] = ["bus", "tram", "metro", "trolley"];

    /// Up to 13 stops on a ~600 m grid with a few random directions over them.
    fn arb_catalog() -> impl Strategy<Value = Catalog> {
        (2usize..14).prop_flat_map(|n| {
            (
                prop::collection::vec((0u32..60, 0u32..60), n),
                prop::collection::vec(prop::collection::vec(0..n, 2..6), 0..4),
            )
                .prop_map(|(cells, paths)| {
                    let stops = cells
                        .iter()
                        .enumerate()
                        .map(|(i, (y, x))| {
                            let lat = 42.70 + 0.0001 * f64::from(*y);
                            let lon = 23.30 + 0.0001 * f64::from(*x);
                            stop(i as u32 + 1, &format!("Stop {i}"), Some((lat, lon)))
                        })
                        .collect();

                    let mut routes = Vec::new();
                    let mut directions = Vec::new();
                    let mut trips = Vec::new();
                    for (j, path) in paths.iter().enumerate() {
                        let j = j as u32;
                        routes.push(RouteRecord {
                            route_index: RouteIndex(j),
                            route_ref: j.to_string(),
                            kind: KINDS[j as usize % KINDS.len()].to_string(),
                        });
                        directions.push(DirectionRecord {
                            code: DirectionCode(100 + j),
                            stops: path.iter().map(|&i| StopCode(i as u32 + 1)).collect(),
                        });
                        trips.push(TripRecord {
                            route_index: RouteIndex(j),
                            direction: DirectionCode(100 + j),
                            is_weekend: false,
                        });
                    }

                    let ds = Dataset::from_records(stops, routes, directions, trips, vec![]);
                    Catalog::new(&ds)
                })
        })
    }

    fn ride(
        snapshot: &NetworkSnapshot,
        from: StopCode,
        to: StopCode,
        direction: DirectionCode,
    ) -> Option<&RideEdge> {
        snapshot
            .rides_from(from)
            .iter()
            .find(|e| e.to == to && e.direction == direction)
    }

    proptest! {
        #[test]
        fn snapshot_invariants_hold_for_every_stop(catalog in arb_catalog()) {
            let config = BuildConfig::default();
            let snapshot = build_at(&catalog, &config, fixed_time());

            for walks in snapshot.proximity.values() {
                prop_assert!(walks.len() <= config.max_walk_neighbours);
                prop_assert!(walks.iter().all(|w| w.distance_m <= config.walk_radius_m));
                prop_assert!(walks.windows(2).all(|w| w[0].distance_m <= w[1].distance_m));
            }

            for direction in catalog.directions() {
                for pair in direction.stops.windows(2) {
                    let forward = ride(&snapshot, pair[0], pair[1], direction.code);
                    let reverse = ride(&snapshot, pair[1], pair[0], direction.code);
                    prop_assert!(forward.is_some(), "missing {} -> {}", pair[0], pair[1]);
                    prop_assert!(reverse.is_some(), "missing {} -> {}", pair[1], pair[0]);

                    let (forward, reverse) = (forward.unwrap(), reverse.unwrap());
                    prop_assert_eq!(forward.transport, reverse.transport);
                    prop_assert_eq!(forward.travel_time_mins, reverse.travel_time_mins);
                    prop_assert_eq!(forward.distance_m, reverse.distance_m);
                }
            }

            let again = build_at(&catalog, &config, fixed_time());
            prop_assert_eq!(&snapshot, &again);
            prop_assert_eq!(snapshot.to_json().unwrap(), again.to_json().unwrap());
        }
    }
}
