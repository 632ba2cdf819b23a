//! Search configuration for the route finder.

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Walking speed used to turn walk-edge distances into minutes.
    pub walk_metres_per_minute: f64,

    /// Fixed buffer added to every walk (finding the stop, waiting to cross).
    pub transfer_buffer_mins: f64,

    /// Heuristic value used when a stop shares no walking neighbour with the
    /// destination. Expressed in the proximity index's distance units.
    pub heuristic_fallback: f64,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        walk_metres_per_minute: f64,
        transfer_buffer_mins: f64,
        heuristic_fallback: f64,
    ) -> Self {
        Self {
            walk_metres_per_minute,
            transfer_buffer_mins,
            heuristic_fallback,
        }
    }

    /// Minutes needed to walk `distance_m`, rounded up, plus the buffer.
    pub fn walk_minutes(&self, distance_m: f64) -> f64 {
        (distance_m / self.walk_metres_per_minute).ceil() + self.transfer_buffer_mins
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            walk_metres_per_minute: 100.0,
            transfer_buffer_mins: 2.0,
            heuristic_fallback: 1000.0,
        }
    }
}
