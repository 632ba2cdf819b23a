//! Route finder using A* search.
//!
//! This module answers: "I am at this stop at this time - what is the
//! earliest I can reach that stop?"
//!
//! The search runs over the precomputed network snapshot. Ride edges are
//! costed through the day's timetable (waiting for the next departure unless
//! the rider is already aboard); walk edges are costed from their distance.

mod config;
mod heuristic;
mod search;
mod step;

pub use config::SearchConfig;
pub use search::{Planner, SearchError, SearchRequest, SearchResult};
pub use step::{Itinerary, Step};

use crate::network::Network;

/// Run a search against a loaded network, using the timetable of the
/// request's service day.
pub fn find_route(
    network: &Network,
    request: &SearchRequest,
    config: &SearchConfig,
) -> Result<SearchResult, SearchError> {
    let schedule = network.timetable.for_day(request.day);
    Planner::new(&network.snapshot, &network.catalog, &schedule, config).find_route(request)
}
