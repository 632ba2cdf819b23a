//! Display instructions produced by the composer.

use std::fmt;

use serde::Serialize;

use crate::domain::{DirectionCode, TransportType, format_clock};

/// What the rider does for one instruction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum InstructionKind {
    Walk {
        from: String,
        to: String,
        departure_time: f64,
        arrival_time: f64,
    },
    Ride {
        direction: DirectionCode,
        transport: TransportType,
        route_ref: String,
        board: String,
        alight: String,
        stops: usize,
        departure_time: f64,
        arrival_time: f64,
    },
}

/// One numbered line of the narrative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    /// 1-based, without gaps.
    pub sequence: usize,

    #[serde(flatten)]
    pub kind: InstructionKind,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InstructionKind::Walk {
                from,
                to,
                departure_time,
                arrival_time,
            } => write!(
                f,
                "{}. Walk from \"{}\" to \"{}\" ({} - {})",
                self.sequence,
                from,
                to,
                format_clock(*departure_time),
                format_clock(*arrival_time)
            ),
            InstructionKind::Ride {
                transport,
                route_ref,
                alight,
                stops,
                departure_time,
                arrival_time,
                ..
            } => write!(
                f,
                "{}. Take {} {} at {} and ride {} {} to \"{}\" (arrival {})",
                self.sequence,
                transport,
                route_ref,
                format_clock(*departure_time),
                stops,
                if *stops == 1 { "stop" } else { "stops" },
                alight,
                format_clock(*arrival_time)
            ),
        }
    }
}
