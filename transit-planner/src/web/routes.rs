//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::catalog::Line;
use crate::dataset::{Dataset, DatasetError};
use crate::domain::{ServiceDay, StopCode, TransportType, format_clock, minute_of_day, parse_clock};
use crate::favorites::SavedItem;
use crate::geometry::map_overlay;
use crate::itinerary::compose;
use crate::network::Network;
use crate::planner::{self, Itinerary, SearchError, SearchRequest};
use crate::store::StoreError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stops/search", get(search_stops))
        .route("/api/stops/:code", get(stop_details))
        .route("/api/lines", get(list_lines))
        .route("/api/lines/:route_ref", get(line_details))
        .route("/api/lines/:route_ref/timetable", get(line_timetable))
        .route("/api/route", get(plan_route))
        .route("/api/route/map", post(route_map))
        .route("/api/favorites", get(list_favorites).post(add_favorite))
        .route("/api/favorites/:id", delete(remove_favorite))
        .route("/api/recent", get(list_recent))
        .route("/admin/reload", post(reload_network))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by name or code.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Json<StopSearchResponse> {
    let limit = req.limit.unwrap_or(10).min(50);
    let network = state.network.current().await;
    let stops = network.catalog.search_stops(&req.q, limit);

    Json(StopSearchResponse { stops })
}

/// A stop and the lines serving it, grouped by transport type.
async fn stop_details(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StopDetailsResponse>, AppError> {
    let code = parse_stop(&code)?;
    let network = state.network.current().await;
    let catalog = &network.catalog;
    let stop = catalog.stop(code).ok_or_else(|| AppError::NotFound {
        message: format!("Unknown stop: {code}"),
    })?;

    let served = catalog.lines_at(code);
    let lines = GROUP_ORDER
        .iter()
        .filter_map(|transport| {
            let refs: Vec<String> = served
                .iter()
                .filter(|l| l.transport == *transport)
                .map(|l| l.route_ref.clone())
                .collect();
            (!refs.is_empty()).then(|| LineGroup {
                transport: *transport,
                lines: refs,
            })
        })
        .collect();

    Ok(Json(StopDetailsResponse {
        code,
        name: stop.name.clone(),
        coords: stop.coords,
        lines,
    }))
}

/// Order of the transport groups on a stop page.
const GROUP_ORDER: [TransportType; 4] = [
    TransportType::Bus,
    TransportType::Tram,
    TransportType::Trolley,
    TransportType::Metro,
];

async fn list_lines(State(state): State<AppState>) -> Json<LinesResponse> {
    let network = state.network.current().await;
    let lines = network
        .catalog
        .lines()
        .iter()
        .map(|line| line_view(&network, line))
        .collect();
    Json(LinesResponse { lines })
}

async fn line_details(
    State(state): State<AppState>,
    Path(route_ref): Path<String>,
) -> Result<Json<LineView>, AppError> {
    let network = state.network.current().await;
    let line = find_line(&network, &route_ref)?;
    Ok(Json(line_view(&network, line)))
}

/// Departures of a line per direction and stop on one service day.
async fn line_timetable(
    State(state): State<AppState>,
    Path(route_ref): Path<String>,
    Query(query): Query<TimetableQuery>,
) -> Result<Json<TimetableResponse>, AppError> {
    let network = state.network.current().await;
    let line = find_line(&network, &route_ref)?;

    let now = Local::now();
    let day = resolve_day(query.day.as_deref(), now)?;
    let from = match query.from.as_deref() {
        Some(raw) => parse_clock(raw).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => minute_of_day(now.time()),
    }
    .floor() as u32;

    if let Some(direction) = query.direction {
        if !line.directions.contains(&direction) {
            return Err(AppError::NotFound {
                message: format!("Line {} has no direction {direction}", line.route_ref),
            });
        }
    }

    let directions = line
        .directions
        .iter()
        .filter(|code| query.direction.is_none_or(|only| only == **code))
        .filter(|code| network.timetable.runs_on(**code, day))
        .filter_map(|code| network.catalog.direction(*code))
        .map(|direction| DirectionTimetable {
            code: direction.code,
            label: network.catalog.direction_label(direction.code),
            stops: network
                .timetable
                .upcoming(direction, day, from)
                .into_iter()
                .map(|row| StopTimetable {
                    stop: row.stop,
                    name: network.catalog.stop_name(row.stop),
                    departures: row
                        .departures
                        .into_iter()
                        .map(|t| format_clock(f64::from(t)))
                        .collect(),
                })
                .collect(),
        })
        .collect();

    Ok(Json(TimetableResponse {
        route_ref: line.route_ref.clone(),
        transport: line.transport,
        day,
        from: format_clock(f64::from(from)),
        directions,
    }))
}

fn find_line<'a>(network: &'a Network, route_ref: &str) -> Result<&'a Line, AppError> {
    network
        .catalog
        .line_by_ref(route_ref)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown line: {route_ref}"),
        })
}

fn line_view(network: &Network, line: &Line) -> LineView {
    LineView {
        route_ref: line.route_ref.clone(),
        transport: line.transport,
        directions: line
            .directions
            .iter()
            .map(|code| DirectionView {
                code: *code,
                label: network.catalog.direction_label(*code),
            })
            .collect(),
    }
}

/// Earliest-arrival route between two stops.
///
/// The route cache is keyed by (start, end) only, so a hit may have been
/// planned for another departure time. An explicit `at` therefore always
/// searches afresh (and refreshes the cache).
async fn plan_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteResponse>, AppError> {
    let network = state.network.current().await;

    let start = parse_stop(&query.from)?;
    let end = parse_stop(&query.to)?;
    for stop in [start, end] {
        if !network.catalog.contains_stop(stop) {
            return Err(SearchError::UnknownStop(stop).into());
        }
    }

    let (depart_after, day) = resolve_departure(
        query.at.as_deref(),
        query.day.as_deref(),
        Local::now(),
    )?;

    let cached = if query.refresh || query.at.is_some() {
        None
    } else {
        state.routes.get(start, end).await
    };

    let (itinerary, from_cache) = match cached {
        Some(itinerary) => (itinerary, true),
        None => {
            let request = SearchRequest::new(start, end, depart_after, day);
            let itinerary = run_search(&state, network.clone(), request)
                .await?
                .ok_or_else(|| AppError::NotFound {
                    message: format!("No route from {start} to {end}"),
                })?;
            state.routes.put(start, end, &itinerary).await;
            (itinerary, false)
        }
    };

    let title = format!(
        "{} → {}",
        network.catalog.stop_name(start),
        network.catalog.stop_name(end)
    );
    if let Err(e) = state.favorites.add_recent(SavedItem::route(start, end, title)).await {
        warn!(error = %e, "failed to record recent route");
    }

    let composed = compose(&itinerary, &network.catalog);
    Ok(Json(RouteResponse::new(itinerary, composed, from_cache)))
}

/// Run a search on the blocking pool, giving up after the configured budget.
///
/// Running out of time counts as no route.
async fn run_search(
    state: &AppState,
    network: Arc<Network>,
    request: SearchRequest,
) -> Result<Option<Itinerary>, AppError> {
    let (start, end) = (request.start, request.end);
    let config = state.search.clone();
    let task =
        tokio::task::spawn_blocking(move || planner::find_route(&network, &request, &config));

    match tokio::time::timeout(state.search_timeout, task).await {
        Ok(Ok(result)) => Ok(result?.itinerary),
        Ok(Err(e)) => Err(AppError::Internal {
            message: format!("search task failed: {e}"),
        }),
        Err(_) => {
            warn!(
                %start,
                %end,
                timeout_ms = state.search_timeout.as_millis() as u64,
                "route search timed out"
            );
            Ok(None)
        }
    }
}

fn parse_stop(raw: &str) -> Result<StopCode, AppError> {
    raw.parse().map_err(|_| AppError::BadRequest {
        message: format!("Invalid stop code: {raw}"),
    })
}

/// Departure minute and service day, defaulting to `now`.
fn resolve_departure(
    at: Option<&str>,
    day: Option<&str>,
    now: DateTime<Local>,
) -> Result<(f64, ServiceDay), AppError> {
    let minutes = match at {
        Some(raw) => parse_clock(raw).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => minute_of_day(now.time()),
    };

    Ok((minutes, resolve_day(day, now)?))
}

/// Service day from a `weekday`/`weekend` parameter, defaulting to `now`'s.
fn resolve_day(day: Option<&str>, now: DateTime<Local>) -> Result<ServiceDay, AppError> {
    match day.map(|d| d.trim().to_ascii_lowercase()) {
        Some(d) if d == "weekday" => Ok(ServiceDay::Weekday),
        Some(d) if d == "weekend" => Ok(ServiceDay::Weekend),
        Some(d) => Err(AppError::BadRequest {
            message: format!("Invalid day: {d} (expected weekday or weekend)"),
        }),
        None => Ok(ServiceDay::from_date(now.date_naive())),
    }
}

/// Polylines for drawing an itinerary.
async fn route_map(
    State(state): State<AppState>,
    Json(req): Json<MapRequest>,
) -> Json<MapResponse> {
    let network = state.network.current().await;
    let polylines = map_overlay(&req.steps, &network.catalog, state.geometry.as_deref()).await;
    Json(MapResponse { polylines })
}

async fn list_favorites(State(state): State<AppState>) -> Json<SavedItemsResponse> {
    Json(SavedItemsResponse {
        items: state.favorites.list().await,
    })
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(item): Json<SavedItem>,
) -> Result<Json<SavedItemsResponse>, AppError> {
    state.favorites.add(item).await?;
    Ok(list_favorites(State(state)).await)
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SavedItemsResponse>, AppError> {
    state.favorites.remove(&id).await?;
    Ok(list_favorites(State(state)).await)
}

async fn list_recent(State(state): State<AppState>) -> Json<SavedItemsResponse> {
    Json(SavedItemsResponse {
        items: state.favorites.recent().await,
    })
}

/// Reload the dataset, rebuild the snapshot and swap the new network in.
///
/// A failed reload leaves the running network untouched.
async fn reload_network(State(state): State<AppState>) -> Result<Json<ReloadResponse>, AppError> {
    let source = state.source.clone();
    let network = tokio::task::spawn_blocking(move || {
        let dataset = Dataset::load(&source.data_dir)?;
        Ok::<_, DatasetError>(Network::from_dataset(&dataset, &source.build))
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("reload task failed: {e}"),
    })??;

    let summary = ReloadResponse {
        stops: network.catalog.stops().len(),
        ride_edges: network.snapshot.ride_edge_count(),
        walk_edges: network.snapshot.walk_edge_count(),
        generated_at: network.snapshot.generated_at,
    };
    let generated_at = network.snapshot.generated_at;
    state.network.replace(network).await;
    state.routes.set_generation(generated_at);
    info!(
        stops = summary.stops,
        ride_edges = summary.ride_edges,
        walk_edges = summary.walk_edges,
        "network reloaded"
    );

    Ok(Json(summary))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<DatasetError> for AppError {
    fn from(e: DatasetError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
