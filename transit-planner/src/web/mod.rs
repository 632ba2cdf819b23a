//! Web layer for the transit planner.
//!
//! Provides HTTP endpoints for stop search, routing, map overlays and saved
//! items.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, NetworkSource};
