//! Domain types for the transit planner.
//!
//! Identifiers, coordinates, transport modes, names and service-day time.
//! These are small value types shared by every other module.

mod geo;
mod ids;
mod names;
mod time;
mod transport;

pub use geo::Coord;
pub use ids::{DirectionCode, RouteIndex, StopCode};
pub use names::{name_tokens, names_similar, normalize_name};
pub use time::{
    InvalidClockTime, MINUTES_PER_DAY, ServiceDay, format_clock, minute_of_day, parse_clock,
};
pub use transport::TransportType;
