//! A* route search over the precomputed network.
//!
//! Finds the earliest-arrival route from one stop to another, departing no
//! earlier than a given minute, combining scheduled rides and short walks.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::domain::{ServiceDay, StopCode};
use crate::network::{NetworkSnapshot, RideEdge};
use crate::timetable::ScheduleLookup;

use super::config::SearchConfig;
use super::heuristic::estimate;
use super::step::{Itinerary, Step};

/// Error from route search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// A stop code not present in the catalog
    #[error("unknown stop {0}")]
    UnknownStop(StopCode),

    /// Invalid search request
    #[error("invalid search request: {0}")]
    InvalidRequest(String),
}

/// Request for route search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub start: StopCode,
    pub end: StopCode,

    /// Minutes from midnight of `day`.
    pub depart_after: f64,

    pub day: ServiceDay,
}

impl SearchRequest {
    pub fn new(start: StopCode, end: StopCode, depart_after: f64, day: ServiceDay) -> Self {
        Self {
            start,
            end,
            depart_after,
            day,
        }
    }

    /// Check the request against the catalog.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), SearchError> {
        if !self.depart_after.is_finite() || self.depart_after < 0.0 {
            return Err(SearchError::InvalidRequest(format!(
                "departure time {} is not a valid minute of day",
                self.depart_after
            )));
        }
        for stop in [self.start, self.end] {
            if !catalog.contains_stop(stop) {
                return Err(SearchError::UnknownStop(stop));
            }
        }
        Ok(())
    }
}

/// Result of route search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The earliest-arrival itinerary, if the end is reachable.
    pub itinerary: Option<Itinerary>,

    /// Number of stops taken off the frontier and expanded.
    pub stops_expanded: usize,
}

/// Best known way of reaching a stop.
#[derive(Debug, Clone)]
struct Label {
    /// Minutes elapsed since the requested departure.
    g: f64,
    step: Step,
    parent: Option<StopCode>,
}

/// Frontier entry; the heap pops the lowest `f`, then the earliest
/// discovered stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrontierEntry {
    f: OrderedFloat<f64>,
    seq: u64,
    stop: StopCode,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Open set, closed set and labels of one search.
struct SearchState {
    end: StopCode,
    frontier: BinaryHeap<FrontierEntry>,
    labels: HashMap<StopCode, Label>,
    discovered: HashMap<StopCode, u64>,
    closed: HashSet<StopCode>,
}

impl SearchState {
    fn new(end: StopCode) -> Self {
        Self {
            end,
            frontier: BinaryHeap::new(),
            labels: HashMap::new(),
            discovered: HashMap::new(),
            closed: HashSet::new(),
        }
    }

    /// Record `label` for `stop` if it improves on the best known one.
    fn relax(&mut self, stop: StopCode, label: Label, h: f64) -> bool {
        if self.labels.get(&stop).is_some_and(|l| label.g >= l.g) {
            return false;
        }

        let next_seq = self.discovered.len() as u64;
        let seq = *self.discovered.entry(stop).or_insert(next_seq);
        self.frontier.push(FrontierEntry {
            f: OrderedFloat(label.g + h),
            seq,
            stop,
        });
        self.labels.insert(stop, label);
        true
    }

    /// Follow parent links back from the end.
    fn reconstruct(&self) -> Itinerary {
        let mut steps = Vec::new();
        let mut cursor = Some(self.end);
        while let Some(stop) = cursor {
            let Some(label) = self.labels.get(&stop) else {
                break;
            };
            steps.push(label.step.clone());
            cursor = label.parent;
        }
        steps.reverse();
        Itinerary::new(steps)
    }
}

/// Route planner over one network snapshot and one day's schedule.
pub struct Planner<'a, S: ScheduleLookup> {
    snapshot: &'a NetworkSnapshot,
    catalog: &'a Catalog,
    schedule: &'a S,
    config: &'a SearchConfig,
}

impl<'a, S: ScheduleLookup> Planner<'a, S> {
    /// Create a new planner.
    pub fn new(
        snapshot: &'a NetworkSnapshot,
        catalog: &'a Catalog,
        schedule: &'a S,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            snapshot,
            catalog,
            schedule,
            config,
        }
    }

    /// Find the earliest-arrival itinerary for `request`.
    ///
    /// Returns `Ok` with no itinerary when the end cannot be reached.
    pub fn find_route(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        request.validate(self.catalog)?;

        let end = request.end;
        let mut state = SearchState::new(end);
        let mut stops_expanded = 0;

        state.relax(
            request.start,
            Label {
                g: 0.0,
                step: Step::origin(request.start, request.depart_after),
                parent: None,
            },
            self.h(request.start, end),
        );

        while let Some(entry) = state.frontier.pop() {
            let current = entry.stop;
            if state.closed.contains(&current) {
                continue;
            }

            if current == end {
                let itinerary = state.reconstruct();
                debug!(
                    start = %request.start,
                    end = %end,
                    stops_expanded,
                    steps = itinerary.len(),
                    arrival = ?itinerary.arrival_time(),
                    "route found"
                );
                return Ok(SearchResult {
                    itinerary: Some(itinerary),
                    stops_expanded,
                });
            }

            state.closed.insert(current);
            stops_expanded += 1;

            let Some(here) = state.labels.get(&current).cloned() else {
                continue;
            };
            trace!(stop = %current, g = here.g, f = entry.f.0, "expanding");

            for edge in self.snapshot.rides_from(current) {
                if state.closed.contains(&edge.to) {
                    continue;
                }

                let departure = if self.continues_aboard(&here, edge) {
                    here.step.arrival_time
                } else {
                    match self.schedule.next_departure(
                        edge.direction,
                        current,
                        here.step.arrival_time,
                    ) {
                        Some(t) => t,
                        None => continue,
                    }
                };
                let arrival = departure + edge.travel_time_mins;
                let route_ref = self.catalog.line(edge.direction).route_ref;

                state.relax(
                    edge.to,
                    Label {
                        g: arrival - request.depart_after,
                        step: Step::ride(edge.to, edge.direction, departure, arrival, route_ref),
                        parent: Some(current),
                    },
                    self.h(edge.to, end),
                );
            }

            for walk in self.snapshot.walks_from(current) {
                if state.closed.contains(&walk.to) {
                    continue;
                }

                let minutes = self.config.walk_minutes(walk.distance_m);
                let step = Step::walk(walk.to, here.step.arrival_time, minutes);

                state.relax(
                    walk.to,
                    Label {
                        g: step.arrival_time - request.depart_after,
                        step,
                        parent: Some(current),
                    },
                    self.h(walk.to, end),
                );
            }
        }

        debug!(
            start = %request.start,
            end = %end,
            stops_expanded,
            "no route found"
        );
        Ok(SearchResult {
            itinerary: None,
            stops_expanded,
        })
    }

    fn h(&self, stop: StopCode, end: StopCode) -> f64 {
        estimate(self.snapshot, stop, end, self.config.heuristic_fallback)
    }

    /// Whether riding `edge` means staying on the vehicle that brought us
    /// here: same direction, travelled the same way along its stop list.
    fn continues_aboard(&self, here: &Label, edge: &RideEdge) -> bool {
        if !here.step.is_ride() || here.step.line != Some(edge.direction) {
            return false;
        }
        let Some(previous) = here.parent else {
            return false;
        };
        let Some(direction) = self.catalog.direction(edge.direction) else {
            return false;
        };

        let (Some(p), Some(c), Some(n)) = (
            direction.position(previous),
            direction.position(edge.from),
            direction.position(edge.to),
        ) else {
            return false;
        };
        (p < c) == (c < n)
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
