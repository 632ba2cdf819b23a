//! Search result units.
//!
//! The serialized shape of [`Step`] is also what the route cache stores and
//! what the map overlay consumes, so field names are part of the wire format.

use serde::{Deserialize, Serialize};

use crate::domain::{DirectionCode, StopCode};

fn is_false(b: &bool) -> bool {
    !*b
}

/// One hop of an itinerary, ending at `stop`.
///
/// The first step of an itinerary is the origin anchor: no line, not
/// walking, departure equal to arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub stop: StopCode,

    /// Direction ridden to reach `stop`; `null` for walks and the origin.
    pub line: Option<DirectionCode>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_walking: bool,

    /// Walk duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,

    pub departure_time: f64,
    pub arrival_time: f64,

    /// Public line number for ride steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_ref: Option<String>,
}

impl Step {
    /// The origin anchor at `stop`, at time `at`.
    pub fn origin(stop: StopCode, at: f64) -> Self {
        Self {
            stop,
            line: None,
            is_walking: false,
            time: None,
            departure_time: at,
            arrival_time: at,
            route_ref: None,
        }
    }

    /// A ride on `direction` arriving at `stop`.
    pub fn ride(
        stop: StopCode,
        direction: DirectionCode,
        departure_time: f64,
        arrival_time: f64,
        route_ref: String,
    ) -> Self {
        Self {
            stop,
            line: Some(direction),
            is_walking: false,
            time: None,
            departure_time,
            arrival_time,
            route_ref: Some(route_ref),
        }
    }

    /// A walk arriving at `stop`.
    pub fn walk(stop: StopCode, departure_time: f64, minutes: f64) -> Self {
        Self {
            stop,
            line: None,
            is_walking: true,
            time: Some(minutes),
            departure_time,
            arrival_time: departure_time + minutes,
            route_ref: None,
        }
    }

    pub fn is_ride(&self) -> bool {
        !self.is_walking && self.line.is_some()
    }

    pub fn is_origin(&self) -> bool {
        !self.is_walking && self.line.is_none()
    }

    /// Duration of the hop in minutes.
    pub fn duration(&self) -> f64 {
        self.time
            .unwrap_or(self.arrival_time - self.departure_time)
    }
}

/// An ordered sequence of steps from the start stop to the end stop.
///
/// Serializes as a flat list of steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary {
    steps: Vec<Step>,
}

impl Itinerary {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn start(&self) -> Option<StopCode> {
        self.steps.first().map(|s| s.stop)
    }

    pub fn end(&self) -> Option<StopCode> {
        self.steps.last().map(|s| s.stop)
    }

    /// Departure time of the itinerary (the origin's time).
    pub fn departure_time(&self) -> Option<f64> {
        self.steps.first().map(|s| s.departure_time)
    }

    /// Arrival time at the final stop.
    pub fn arrival_time(&self) -> Option<f64> {
        self.steps.last().map(|s| s.arrival_time)
    }
}
