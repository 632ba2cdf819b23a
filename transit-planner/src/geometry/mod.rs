//! Road geometry for drawing itineraries on a map.
//!
//! Ride hops follow the road network when a routing service is configured;
//! everything else is drawn as a straight line between stops.

mod osrm;
mod overlay;

use std::future::Future;

use crate::domain::Coord;

pub use osrm::{OsrmClient, OsrmConfig};
pub use overlay::{Polyline, WALK_COLOUR, line_colour, map_overlay};

/// Errors from the road-geometry service.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("routing service error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Service answered but found no route
    #[error("no road route between the given points")]
    NoRoute,
}

/// Road-following path through a sequence of points.
pub trait RoadGeometry: Send + Sync {
    fn route(&self, points: &[Coord]) -> impl Future<Output = Result<Vec<Coord>, GeometryError>> + Send;
}
