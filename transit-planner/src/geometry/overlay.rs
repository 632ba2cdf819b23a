//! Map overlay: one coloured polyline per itinerary hop.

use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use super::RoadGeometry;
use crate::catalog::Catalog;
use crate::domain::{Coord, DirectionCode, StopCode};
use crate::planner::{Itinerary, Step};

/// Colour of walking hops.
pub const WALK_COLOUR: &str = "#FF0000";

/// A drawable hop between two consecutive stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Polyline {
    pub from: StopCode,
    pub to: StopCode,
    pub is_walking: bool,
    pub colour: String,
    pub points: Vec<Coord>,
}

/// Distinct hue per direction, spread by the golden angle.
pub fn line_colour(direction: DirectionCode) -> String {
    let hue = (f64::from(direction.0) * 137.5) % 360.0;
    format!("hsl({hue}, 70%, 50%)")
}

/// Build the overlay for an itinerary.
///
/// Ride hops ask `geometry` for a road path and fall back to a straight line
/// when it fails or is absent. Hops touching a stop without coordinates are
/// left out. Never fails.
pub async fn map_overlay<G: RoadGeometry>(
    itinerary: &Itinerary,
    catalog: &Catalog,
    geometry: Option<&G>,
) -> Vec<Polyline> {
    let hops = itinerary.steps().windows(2).filter_map(|pair| {
        let (from, to) = (&pair[0], &pair[1]);
        let a = catalog.stop(from.stop)?.coords?;
        let b = catalog.stop(to.stop)?.coords?;
        Some(hop(from, to, a, b, geometry))
    });

    join_all(hops).await
}

async fn hop<G: RoadGeometry>(
    from: &Step,
    to: &Step,
    a: Coord,
    b: Coord,
    geometry: Option<&G>,
) -> Polyline {
    let straight = vec![a, b];

    let (colour, points) = match to.line {
        Some(direction) if !to.is_walking => {
            let points = match geometry {
                Some(g) => match g.route(&[a, b]).await {
                    Ok(points) => points,
                    Err(e) => {
                        warn!(from = %from.stop, to = %to.stop, error = %e, "road geometry unavailable, drawing straight line");
                        straight
                    }
                },
                None => straight,
            };
            (line_colour(direction), points)
        }
        _ => (WALK_COLOUR.to_string(), straight),
    };

    Polyline {
        from: from.stop,
        to: to.stop,
        is_walking: to.is_walking,
        colour,
        points,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::dataset::{Dataset, StopRecord};
    use crate::geometry::GeometryError;

    struct FakeRoads {
        fail: bool,
        calls: AtomicUsize,
    }

    impl RoadGeometry for FakeRoads {
        async fn route(&self, points: &[Coord]) -> Result<Vec<Coord>, GeometryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GeometryError::NoRoute);
            }
            let (a, b) = (points[0], points[points.len() - 1]);
            let mid = Coord::new((a.lat + b.lat) / 2.0, (a.lon + b.lon) / 2.0 + 0.001);
            Ok(vec![a, mid, b])
        }
    }

    fn catalog() -> Catalog {
        let stop = |code: u32, coords: Option<Coord>| StopRecord {
            code: StopCode(code),
            names: BTreeMap::new(),
            coords,
            route_indexes: vec![],
        };
        let ds = Dataset::from_records(
            vec![
                stop(1, Some(Coord::new(42.70, 23.30))),
                stop(2, Some(Coord::new(42.71, 23.30))),
                stop(3, Some(Coord::new(42.7109, 23.30))),
                stop(4, None),
            ],
            vec![],
            vec![],
            vec![],
            vec![],
        );
        Catalog::new(&ds)
    }

    fn itinerary() -> Itinerary {
        Itinerary::new(vec![
            Step::origin(StopCode(1), 470.0),
            Step::ride(StopCode(2), DirectionCode(10), 480.0, 482.0, "5".to_string()),
            Step::walk(StopCode(3), 482.0, 3.0),
        ])
    }

    #[test]
    fn colours() {
        assert_eq!(line_colour(DirectionCode(10)), "hsl(295, 70%, 50%)");
        assert_eq!(line_colour(DirectionCode(1)), "hsl(137.5, 70%, 50%)");
        assert_eq!(line_colour(DirectionCode(0)), "hsl(0, 70%, 50%)");
    }

    #[tokio::test]
    async fn rides_follow_roads_and_walks_are_straight() {
        let roads = FakeRoads {
            fail: false,
            calls: AtomicUsize::new(0),
        };
        let overlay = map_overlay(&itinerary(), &catalog(), Some(&roads)).await;

        assert_eq!(overlay.len(), 2);
        assert_eq!(overlay[0].points.len(), 3);
        assert_eq!(overlay[0].colour, "hsl(295, 70%, 50%)");
        assert!(!overlay[0].is_walking);

        assert_eq!(overlay[1].points.len(), 2);
        assert_eq!(overlay[1].colour, WALK_COLOUR);
        assert!(overlay[1].is_walking);

        // Walks never ask the service
        assert_eq!(roads.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_service_falls_back_to_straight_line() {
        let roads = FakeRoads {
            fail: true,
            calls: AtomicUsize::new(0),
        };
        let overlay = map_overlay(&itinerary(), &catalog(), Some(&roads)).await;
        assert_eq!(
            overlay[0].points,
            vec![Coord::new(42.70, 23.30), Coord::new(42.71, 23.30)]
        );
    }

    #[tokio::test]
    async fn without_service_everything_is_straight() {
        let overlay = map_overlay::<FakeRoads>(&itinerary(), &catalog(), None).await;
        assert!(overlay.iter().all(|p| p.points.len() == 2));
    }

    #[tokio::test]
    async fn skips_hops_without_coordinates() {
        let itinerary = Itinerary::new(vec![
            Step::origin(StopCode(1), 470.0),
            Step::walk(StopCode(4), 470.0, 3.0),
            Step::walk(StopCode(2), 473.0, 3.0),
        ]);
        let overlay = map_overlay::<FakeRoads>(&itinerary, &catalog(), None).await;
        assert!(overlay.is_empty());
    }
}
