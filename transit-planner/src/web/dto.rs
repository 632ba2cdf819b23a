//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::StopMatch;
use crate::domain::{Coord, DirectionCode, ServiceDay, StopCode, TransportType};
use crate::favorites::SavedItem;
use crate::geometry::Polyline;
use crate::itinerary::{ComposedItinerary, Instruction};
use crate::planner::Itinerary;

/// Request to search stops.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Search query (name or code)
    pub q: String,

    /// Maximum results (default 10, max 50)
    pub limit: Option<usize>,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopMatch>,
}

/// Query for a route between two stops.
#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    /// Start stop code
    pub from: String,

    /// End stop code
    pub to: String,

    /// Departure time in HH:MM format (defaults to now)
    pub at: Option<String>,

    /// `weekday` or `weekend` (defaults to today's)
    pub day: Option<String>,

    /// Skip the route cache
    #[serde(default)]
    pub refresh: bool,
}

/// An instruction with its rendered text.
#[derive(Debug, Serialize)]
pub struct InstructionView {
    pub text: String,

    #[serde(flatten)]
    pub instruction: Instruction,
}

/// Response for a route query.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    /// Raw itinerary steps
    pub steps: Itinerary,

    pub instructions: Vec<InstructionView>,

    pub total_minutes: i64,

    /// Whether the steps came from the route cache
    pub cached: bool,
}

impl RouteResponse {
    pub fn new(steps: Itinerary, composed: ComposedItinerary, cached: bool) -> Self {
        let instructions = composed
            .instructions
            .into_iter()
            .map(|instruction| InstructionView {
                text: instruction.to_string(),
                instruction,
            })
            .collect();

        Self {
            steps,
            instructions,
            total_minutes: composed.total_minutes,
            cached,
        }
    }
}

/// Request for a map overlay.
#[derive(Debug, Deserialize)]
pub struct MapRequest {
    pub steps: Itinerary,
}

/// Response for a map overlay.
#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub polylines: Vec<Polyline>,
}

/// Favorites or recents.
#[derive(Debug, Serialize)]
pub struct SavedItemsResponse {
    pub items: Vec<SavedItem>,
}

/// Summary of a reloaded network.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub stops: usize,
    pub ride_edges: usize,
    pub walk_edges: usize,
    pub generated_at: DateTime<Utc>,
}

/// A stop with the lines serving it.
#[derive(Debug, Serialize)]
pub struct StopDetailsResponse {
    pub code: StopCode,
    pub name: String,
    pub coords: Option<Coord>,

    /// Line references grouped by transport type
    pub lines: Vec<LineGroup>,
}

/// Line references of one transport type.
#[derive(Debug, PartialEq, Serialize)]
pub struct LineGroup {
    pub transport: TransportType,
    pub lines: Vec<String>,
}

/// A direction with its display label.
#[derive(Debug, PartialEq, Serialize)]
pub struct DirectionView {
    pub code: DirectionCode,
    pub label: String,
}

/// A line with its directions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub route_ref: String,
    pub transport: TransportType,
    pub directions: Vec<DirectionView>,
}

/// All lines.
#[derive(Debug, Serialize)]
pub struct LinesResponse {
    pub lines: Vec<LineView>,
}

/// Query for a line timetable.
#[derive(Debug, Default, Deserialize)]
pub struct TimetableQuery {
    /// `weekday` or `weekend` (defaults to today's)
    pub day: Option<String>,

    /// Earliest departure shown, HH:MM (defaults to now; `00:00` gives the
    /// whole day)
    pub from: Option<String>,

    /// Restrict to one direction
    pub direction: Option<DirectionCode>,
}

/// Departures from one stop, as HH:MM.
#[derive(Debug, Serialize)]
pub struct StopTimetable {
    pub stop: StopCode,
    pub name: String,
    pub departures: Vec<String>,
}

/// Timetable of one direction.
#[derive(Debug, Serialize)]
pub struct DirectionTimetable {
    pub code: DirectionCode,
    pub label: String,
    pub stops: Vec<StopTimetable>,
}

/// Timetable of a line on one service day.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    pub route_ref: String,
    pub transport: TransportType,
    pub day: ServiceDay,
    pub from: String,
    pub directions: Vec<DirectionTimetable>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
