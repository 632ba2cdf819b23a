//! Transport modes and their nominal speeds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of vehicle operating a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Metro,
    Tram,
    Trolley,
    Bus,
}

impl TransportType {
    /// Map a dataset route `type` onto a transport type.
    ///
    /// Unknown labels are treated as buses.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "metro" | "subway" => TransportType::Metro,
            "tram" => TransportType::Tram,
            "trolley" | "trolleybus" => TransportType::Trolley,
            _ => TransportType::Bus,
        }
    }

    /// Average commercial speed in km/h used to estimate ride times.
    pub fn speed_kmh(self) -> f64 {
        match self {
            TransportType::Metro => 40.0,
            TransportType::Tram => 25.0,
            TransportType::Trolley => 25.0,
            TransportType::Bus => 30.0,
        }
    }

    /// Minutes needed to cover `distance_m` at this mode's speed.
    pub fn travel_minutes(self, distance_m: f64) -> f64 {
        (distance_m / 1000.0) / self.speed_kmh() * 60.0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportType::Metro => "metro",
            TransportType::Tram => "tram",
            TransportType::Trolley => "trolley",
            TransportType::Bus => "bus",
        }
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
