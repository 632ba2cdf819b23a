//! Turns a raw itinerary into numbered, human-readable instructions.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::domain::{DirectionCode, StopCode, normalize_name};
use crate::planner::{Itinerary, Step};

use super::instruction::{Instruction, InstructionKind};

/// Instructions for an itinerary plus its total travel time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedItinerary {
    pub instructions: Vec<Instruction>,

    /// Walking time of the kept walks plus the span of every ride segment,
    /// rounded once.
    pub total_minutes: i64,
}

impl ComposedItinerary {
    /// The rendered instruction lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.instructions.iter().map(ToString::to_string).collect()
    }
}

/// Turn raw search steps into numbered instructions.
///
/// Consecutive rides on one direction merge into a single instruction. Walks
/// that go nowhere (same stop, or a stop with the same normalized name) are
/// dropped along with their time.
pub fn compose(itinerary: &Itinerary, catalog: &Catalog) -> ComposedItinerary {
    let steps = itinerary.steps();
    let mut instructions = Vec::new();
    let mut total = 0.0;

    let mut i = 0;
    while i < steps.len() {
        let step = &steps[i];
        let previous = if i > 0 { steps[i - 1].stop } else { step.stop };

        if step.is_walking {
            let from = catalog.stop_name(previous);
            let to = catalog.stop_name(step.stop);
            if previous != step.stop && normalize_name(&from) != normalize_name(&to) {
                instructions.push(Instruction {
                    sequence: instructions.len() + 1,
                    kind: InstructionKind::Walk {
                        from,
                        to,
                        departure_time: step.departure_time,
                        arrival_time: step.arrival_time,
                    },
                });
                total += step.duration();
            }
            i += 1;
            continue;
        }

        let Some(direction) = step.line else {
            // Origin anchor
            i += 1;
            continue;
        };

        let last = segment_end(steps, i, direction);
        let end_step = &steps[last];
        let stops = stop_count(catalog, direction, previous, end_step.stop);

        if stops > 0 {
            let line = catalog.line(direction);
            instructions.push(Instruction {
                sequence: instructions.len() + 1,
                kind: InstructionKind::Ride {
                    direction,
                    transport: line.transport,
                    route_ref: step.route_ref.clone().unwrap_or(line.route_ref),
                    board: catalog.stop_name(previous),
                    alight: catalog.stop_name(end_step.stop),
                    stops,
                    departure_time: step.departure_time,
                    arrival_time: end_step.arrival_time,
                },
            });
        }
        total += end_step.arrival_time - step.departure_time;

        i = last + 1;
    }

    ComposedItinerary {
        instructions,
        total_minutes: total.round() as i64,
    }
}

/// Index of the last ride step continuing the segment that starts at `first`.
fn segment_end(steps: &[Step], first: usize, direction: DirectionCode) -> usize {
    let mut last = first;
    while steps
        .get(last + 1)
        .is_some_and(|s| s.is_ride() && s.line == Some(direction))
    {
        last += 1;
    }
    last
}

/// Stops travelled between `board` and `alight` along `direction`; at least
/// one when the stops differ.
fn stop_count(catalog: &Catalog, direction: DirectionCode, board: StopCode, alight: StopCode) -> usize {
    let span = catalog
        .direction(direction)
        .and_then(|d| Some(d.position(board)?.abs_diff(d.position(alight)?)))
        .unwrap_or(0);

    if span == 0 && board != alight { 1 } else { span }
}
