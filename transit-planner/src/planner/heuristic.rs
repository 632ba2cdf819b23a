//! Remaining-cost estimate for the route search.
//!
//! The estimate comes from the proximity index: zero when the stop can walk
//! straight to the destination, the shortest two-hop walking distance via a
//! shared neighbour otherwise, and a fixed fallback when there is none. It is
//! only a lower bound for short hops; the search's tie-breaking and results
//! depend on this exact shape.

use crate::domain::StopCode;
use crate::network::NetworkSnapshot;

pub(crate) fn estimate(snapshot: &NetworkSnapshot, stop: StopCode, end: StopCode, fallback: f64) -> f64 {
    let near = snapshot.walks_from(stop);
    if near.iter().any(|w| w.to == end) {
        return 0.0;
    }

    let end_near = snapshot.walks_from(end);
    let best = near
        .iter()
        .flat_map(|a| {
            end_near
                .iter()
                .filter(move |b| b.to == a.to)
                .map(move |b| a.distance_m + b.distance_m)
        })
        .fold(f64::INFINITY, f64::min);

    if best.is_finite() { best } else { fallback }
}
