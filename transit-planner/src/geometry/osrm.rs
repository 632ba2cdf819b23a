//! OSRM route service client.

use serde::Deserialize;

use super::{GeometryError, RoadGeometry};
use crate::domain::Coord;

/// Public OSRM demo server.
const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Deserialize)]
struct RouteResponse {
    #[serde(default)]
    routes: Vec<RouteDto>,
}

#[derive(Debug, Deserialize)]
struct RouteDto {
    geometry: GeometryDto,
}

/// GeoJSON line string; positions are `[lon, lat]`.
#[derive(Debug, Deserialize)]
struct GeometryDto {
    coordinates: Vec<[f64; 2]>,
}

/// Configuration for the OSRM client.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OsrmConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
        }
    }
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Client for the OSRM `route` service.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    http: reqwest::Client,
    base_url: String,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, GeometryError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn route_url(&self, points: &[Coord]) -> String {
        let coords = points
            .iter()
            .map(|c| format!("{},{}", c.lon, c.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/driving/{}?overview=full&geometries=geojson",
            self.base_url, coords
        )
    }
}

impl RoadGeometry for OsrmClient {
    async fn route(&self, points: &[Coord]) -> Result<Vec<Coord>, GeometryError> {
        let url = self.route_url(points);
        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeometryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_route(&body)
    }
}

/// First route's geometry as coordinates.
fn parse_route(body: &str) -> Result<Vec<Coord>, GeometryError> {
    let response: RouteResponse = serde_json::from_str(body).map_err(|e| GeometryError::Json {
        message: e.to_string(),
    })?;

    let route = response.routes.into_iter().next().ok_or(GeometryError::NoRoute)?;
    if route.geometry.coordinates.is_empty() {
        return Err(GeometryError::NoRoute);
    }

    Ok(route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lon, lat]| Coord::new(lat, lon))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_lon_lat_order() {
        let client = OsrmClient::new(OsrmConfig::new("http://localhost:5000/")).unwrap();
        let url = client.route_url(&[Coord::new(42.7, 23.3), Coord::new(42.71, 23.31)]);
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/driving/23.3,42.7;23.31,42.71?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn parses_first_route() {
        let body = r#"{
            "code": "Ok",
            "routes": [
                {"geometry": {"type": "LineString", "coordinates": [[23.3, 42.7], [23.305, 42.705]]}, "distance": 900},
                {"geometry": {"type": "LineString", "coordinates": [[0.0, 0.0]]}}
            ]
        }"#;
        let points = parse_route(body).unwrap();
        assert_eq!(points, vec![Coord::new(42.7, 23.3), Coord::new(42.705, 23.305)]);
    }

    #[test]
    fn no_routes_is_an_error() {
        assert!(matches!(
            parse_route(r#"{"code": "NoRoute", "routes": []}"#),
            Err(GeometryError::NoRoute)
        ));
        assert!(matches!(
            parse_route(r#"{"code": "NoRoute"}"#),
            Err(GeometryError::NoRoute)
        ));
        assert!(matches!(parse_route("<html>"), Err(GeometryError::Json { .. })));
    }

    #[test]
    fn default_points_at_public_server() {
        assert_eq!(OsrmConfig::default().base_url, DEFAULT_BASE_URL);
    }
}
