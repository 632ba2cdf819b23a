//! Scheduled departures per direction and stop position.
//!
//! Times returned by a [`ScheduleLookup`] are elapsed minutes from midnight
//! of the query's service day. When nothing departs at or after the bound on
//! the bound's day, the first departure of the following day is returned
//! (shifted by 1440), so times never go backwards along an itinerary.

use std::collections::HashMap;

use crate::catalog::{Catalog, DirectionInfo};
use crate::dataset::Dataset;
use crate::domain::{DirectionCode, MINUTES_PER_DAY, ServiceDay, StopCode};

/// Next-departure lookup consumed by the planner.
pub trait ScheduleLookup {
    /// Earliest departure of any trip of `direction` from `stop` at or after
    /// `not_before`, wrapping to the next day if needed.
    ///
    /// Returns `None` when the direction never serves that stop.
    fn next_departure(
        &self,
        direction: DirectionCode,
        stop: StopCode,
        not_before: f64,
    ) -> Option<f64>;
}

/// Departures from one stop of a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopDepartures {
    /// Position of the stop within the direction.
    pub position: usize,
    pub stop: StopCode,
    /// Sorted minutes of day.
    pub departures: Vec<u32>,
}

/// Departure index built from the stop-times table.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    /// Sorted, de-duplicated minutes per stop position.
    departures: HashMap<(DirectionCode, ServiceDay), Vec<Vec<u32>>>,

    /// First position of each stop within each direction.
    positions: HashMap<DirectionCode, HashMap<StopCode, usize>>,
}

impl Timetable {
    pub fn new(dataset: &Dataset, catalog: &Catalog) -> Self {
        let mut positions: HashMap<DirectionCode, HashMap<StopCode, usize>> = HashMap::new();
        for direction in catalog.directions() {
            let index = positions.entry(direction.code).or_default();
            for (pos, stop) in direction.stops.iter().enumerate() {
                index.entry(*stop).or_insert(pos);
            }
        }

        let trips: HashMap<u32, _> = dataset.trips.iter().map(|t| (t.id, t)).collect();

        let mut departures: HashMap<(DirectionCode, ServiceDay), Vec<Vec<u32>>> = HashMap::new();
        for stop_times in &dataset.stop_times {
            let Some(trip) = trips.get(&stop_times.trip) else {
                continue;
            };
            let Some(direction) = catalog.direction(trip.direction) else {
                continue;
            };

            let slots = departures
                .entry((trip.direction, trip.day))
                .or_insert_with(|| vec![Vec::new(); direction.stops.len()]);

            for (pos, time) in stop_times.times.iter().enumerate().take(slots.len()) {
                if let Some(t) = time {
                    slots[pos].push(*t);
                }
            }
        }

        for slots in departures.values_mut() {
            for times in slots.iter_mut() {
                times.sort_unstable();
                times.dedup();
            }
        }

        Self {
            departures,
            positions,
        }
    }

    /// All departures of `direction` at `stop` on `day`, sorted.
    pub fn departures_at(&self, direction: DirectionCode, stop: StopCode, day: ServiceDay) -> &[u32] {
        let Some(pos) = self.positions.get(&direction).and_then(|p| p.get(&stop)) else {
            return &[];
        };
        self.departures
            .get(&(direction, day))
            .and_then(|slots| slots.get(*pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any trip of `direction` runs on `day`.
    pub fn runs_on(&self, direction: DirectionCode, day: ServiceDay) -> bool {
        self.departures
            .get(&(direction, day))
            .is_some_and(|slots| slots.iter().any(|times| !times.is_empty()))
    }

    /// Departures at or after minute `from` for every stop of `direction`,
    /// in stop order. Stops with nothing left that day are omitted.
    pub fn upcoming(
        &self,
        direction: &DirectionInfo,
        day: ServiceDay,
        from: u32,
    ) -> Vec<StopDepartures> {
        let Some(slots) = self.departures.get(&(direction.code, day)) else {
            return Vec::new();
        };

        direction
            .stops
            .iter()
            .zip(slots)
            .enumerate()
            .filter_map(|(position, (stop, times))| {
                let first = times.partition_point(|t| *t < from);
                let departures = times[first..].to_vec();
                (!departures.is_empty()).then_some(StopDepartures {
                    position,
                    stop: *stop,
                    departures,
                })
            })
            .collect()
    }

    /// Lookup view for one service day.
    pub fn for_day(&self, day: ServiceDay) -> DaySchedule<'_> {
        DaySchedule {
            timetable: self,
            day,
        }
    }
}

/// A [`Timetable`] restricted to one service day.
#[derive(Debug, Clone, Copy)]
pub struct DaySchedule<'a> {
    timetable: &'a Timetable,
    day: ServiceDay,
}

impl ScheduleLookup for DaySchedule<'_> {
    fn next_departure(
        &self,
        direction: DirectionCode,
        stop: StopCode,
        not_before: f64,
    ) -> Option<f64> {
        next_in_sorted(
            self.timetable.departures_at(direction, stop, self.day),
            not_before,
        )
    }
}

/// Earliest entry of `times` at or after `not_before`, on the bound's day or
/// wrapped into the next one.
pub(crate) fn next_in_sorted(times: &[u32], not_before: f64) -> Option<f64> {
    let first = *times.first()?;

    let day_offset = (not_before / MINUTES_PER_DAY).floor().max(0.0) * MINUTES_PER_DAY;
    let local = not_before - day_offset;

    let idx = times.partition_point(|t| f64::from(*t) < local);
    match times.get(idx) {
        Some(t) => Some(day_offset + f64::from(*t)),
        None => Some(day_offset + MINUTES_PER_DAY + f64::from(first)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::catalog::LineInfo;
    use crate::dataset::{DirectionRecord, RouteRecord, StopRecord, StopTimeRecord, TripRecord};
    use crate::domain::{Coord, RouteIndex, TransportType};

    fn timetable() -> Timetable {
        let stops = (1..=3)
            .map(|c| StopRecord {
                code: StopCode(c),
                names: BTreeMap::new(),
                coords: Some(Coord::new(42.7, 23.3)),
                route_indexes: vec![],
            })
            .collect();
        let ds = Dataset::from_records(
            stops,
            vec![RouteRecord {
                route_index: RouteIndex(0),
                route_ref: "5".to_string(),
                kind: "bus".to_string(),
            }],
            vec![DirectionRecord {
                code: DirectionCode(10),
                stops: vec![StopCode(1), StopCode(2), StopCode(3)],
            }],
            vec![
                TripRecord {
                    route_index: RouteIndex(0),
                    direction: DirectionCode(10),
                    is_weekend: false,
                },
                TripRecord {
                    route_index: RouteIndex(0),
                    direction: DirectionCode(10),
                    is_weekend: false,
                },
                TripRecord {
                    route_index: RouteIndex(0),
                    direction: DirectionCode(10),
                    is_weekend: true,
                },
            ],
            vec![
                StopTimeRecord {
                    trip: 0,
                    times: vec![Some(480), Some(485), Some(490)],
                },
                StopTimeRecord {
                    trip: 1,
                    times: vec![Some(420), None, Some(430), Some(999)],
                },
                // Duplicate of trip 0's times
                StopTimeRecord {
                    trip: 0,
                    times: vec![Some(480), Some(485), Some(490)],
                },
                StopTimeRecord {
                    trip: 2,
                    times: vec![Some(600), Some(605), Some(610)],
                },
            ],
        );
        let catalog = Catalog::new(&ds);
        Timetable::new(&ds, &catalog)
    }

    #[test]
    fn departures_are_sorted_and_deduplicated() {
        let tt = timetable();
        assert_eq!(
            tt.departures_at(DirectionCode(10), StopCode(1), ServiceDay::Weekday),
            &[420, 480]
        );
        // Trip 1 skips position 1
        assert_eq!(
            tt.departures_at(DirectionCode(10), StopCode(2), ServiceDay::Weekday),
            &[485]
        );
        assert_eq!(
            tt.departures_at(DirectionCode(10), StopCode(1), ServiceDay::Weekend),
            &[600]
        );
    }

    #[test]
    fn unknown_stop_or_direction_has_no_departures() {
        let tt = timetable();
        assert!(tt.departures_at(DirectionCode(10), StopCode(9), ServiceDay::Weekday).is_empty());
        assert!(tt.departures_at(DirectionCode(11), StopCode(1), ServiceDay::Weekday).is_empty());

        let lookup = tt.for_day(ServiceDay::Weekday);
        assert_eq!(lookup.next_departure(DirectionCode(10), StopCode(9), 0.0), None);
    }

    #[test]
    fn next_departure_same_day() {
        let tt = timetable();
        let lookup = tt.for_day(ServiceDay::Weekday);
        assert_eq!(lookup.next_departure(DirectionCode(10), StopCode(1), 400.0), Some(420.0));
        assert_eq!(lookup.next_departure(DirectionCode(10), StopCode(1), 420.0), Some(420.0));
        assert_eq!(lookup.next_departure(DirectionCode(10), StopCode(1), 420.5), Some(480.0));
    }

    #[test]
    fn next_departure_wraps_to_next_day() {
        let tt = timetable();
        let lookup = tt.for_day(ServiceDay::Weekday);
        // Nothing after 08:00 at stop 1 on a weekday: first departure tomorrow
        assert_eq!(
            lookup.next_departure(DirectionCode(10), StopCode(1), 481.0),
            Some(1440.0 + 420.0)
        );
    }

    #[test]
    fn bounds_past_midnight() {
        assert_eq!(next_in_sorted(&[420, 480], 1440.0 + 450.0), Some(1440.0 + 480.0));
        assert_eq!(next_in_sorted(&[420, 480], 1440.0 + 500.0), Some(2880.0 + 420.0));
    }

    #[test]
    fn empty_times_give_none() {
        assert_eq!(next_in_sorted(&[], 100.0), None);
    }

    #[test]
    fn result_is_never_before_bound() {
        for bound in [0.0, 419.9, 480.0, 1000.0, 1439.9, 2000.0] {
            let t = next_in_sorted(&[420, 480], bound).unwrap();
            assert!(t >= bound, "{t} < {bound}");
        }
    }

    #[test]
    fn upcoming_board_per_stop() {
        let tt = timetable();
        let direction = DirectionInfo {
            code: DirectionCode(10),
            stops: vec![StopCode(1), StopCode(2), StopCode(3)],
            line: LineInfo {
                route_index: Some(RouteIndex(0)),
                route_ref: "5".to_string(),
                transport: TransportType::Bus,
            },
        };

        let board = tt.upcoming(&direction, ServiceDay::Weekday, 450);
        let rows: Vec<(usize, Vec<u32>)> =
            board.into_iter().map(|s| (s.position, s.departures)).collect();
        assert_eq!(rows, vec![(0, vec![480]), (1, vec![485]), (2, vec![490])]);

        // Stops with nothing left are dropped
        let board = tt.upcoming(&direction, ServiceDay::Weekday, 486);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].stop, StopCode(3));
        assert_eq!(board[0].departures, vec![490]);

        let board = tt.upcoming(&direction, ServiceDay::Weekend, 0);
        assert_eq!(board[0].departures, vec![600]);
    }

    #[test]
    fn service_days_of_a_direction() {
        let tt = timetable();
        assert!(tt.runs_on(DirectionCode(10), ServiceDay::Weekday));
        assert!(tt.runs_on(DirectionCode(10), ServiceDay::Weekend));
        assert!(!tt.runs_on(DirectionCode(11), ServiceDay::Weekday));
    }
}
