//! HTTP surface of the routing API.
//!
//! Thin handlers: extract, call into `viabus_core`, convert to DTOs. All
//! domain errors map to a JSON `{"error": …}` body with a status chosen
//! from the error kind.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use viabus_core::deadline::{Deadline, retry_once};
use viabus_core::planning::journey::plan_journey;
use viabus_core::planning::route_connector::{find_routes_between_stops, routes_at_stop};
use viabus_core::planning::route_details::route_details;
use viabus_core::planning::stop_locator::find_nearest_stops;
use viabus_core::{Error, RouteId, StopId};

use crate::dto::{
    ErrorResponse, JourneyDto, NearestStopDto, NearestStopsQuery, PlanJourneyParams,
    PlanJourneyRequest, RouteCandidateDto, RouteDetailsDto, RouteDetailsQuery, RouteTypesResponse,
    RoutesBetweenQuery, StopRouteDto,
};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/nearest-stops", get(nearest_stops))
        .route("/routes-between-stops", get(routes_between_stops))
        .route("/route-details/{route_id}", get(route_details_handler))
        .route("/plan-journey", post(plan_journey_handler))
        .route("/routes-at-stop/{stop_id}", get(routes_at_stop_handler))
        .route("/route-types", get(route_types_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/routing", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn nearest_stops(
    State(state): State<AppState>,
    Query(query): Query<NearestStopsQuery>,
) -> Result<Json<Vec<NearestStopDto>>, AppError> {
    let point = geo::Point::new(query.lng, query.lat);
    let stops = find_nearest_stops(&state.network, point, query.max_distance, query.limit)?;
    Ok(Json(stops.iter().map(NearestStopDto::from).collect()))
}

async fn routes_between_stops(
    State(state): State<AppState>,
    Query(query): Query<RoutesBetweenQuery>,
) -> Result<Json<Vec<RouteCandidateDto>>, AppError> {
    let deadline = Deadline::after(state.planning.sub_call_timeout);
    let candidates = retry_once(deadline, |d| {
        find_routes_between_stops(&state.network, query.start_stop_id, query.end_stop_id, d)
    })?;
    Ok(Json(candidates.iter().map(RouteCandidateDto::from).collect()))
}

async fn route_details_handler(
    State(state): State<AppState>,
    Path(route_id): Path<RouteId>,
    Query(query): Query<RouteDetailsQuery>,
) -> Result<Json<RouteDetailsDto>, AppError> {
    let details = route_details(
        &state.network,
        route_id,
        query.start_stop_id,
        query.end_stop_id,
    )?;
    Ok(Json(RouteDetailsDto::from(&details)))
}

async fn plan_journey_handler(
    State(state): State<AppState>,
    Query(params): Query<PlanJourneyParams>,
    Json(request): Json<PlanJourneyRequest>,
) -> Result<Json<JourneyDto>, AppError> {
    let network = Arc::clone(&state.network);
    let mut config = (*state.planning).clone();
    if let Some(distance) = params.max_walk_distance {
        config.max_walk_distance = distance;
    }
    // Planning fans out on rayon; keep it off the async workers.
    let journey = tokio::task::spawn_blocking(move || {
        plan_journey(&network, request.start.into(), request.end.into(), &config)
    })
    .await
    .map_err(|e| AppError::internal(format!("planning task failed: {e}")))??;
    Ok(Json(JourneyDto::from(&journey)))
}

async fn routes_at_stop_handler(
    State(state): State<AppState>,
    Path(stop_id): Path<StopId>,
) -> Result<Json<Vec<StopRouteDto>>, AppError> {
    let entries = routes_at_stop(&state.network, stop_id)?;
    if entries.is_empty() {
        return Err(AppError::not_found(format!(
            "no routes serve stop {stop_id}"
        )));
    }
    Ok(Json(entries.iter().map(StopRouteDto::from).collect()))
}

async fn route_types_handler(State(state): State<AppState>) -> Json<RouteTypesResponse> {
    Json(RouteTypesResponse {
        route_types: state.network.route_types(),
    })
}

/// Rejects requests without the configured bearer token. A state without a
/// token leaves the API open.
async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(token) = &state.auth_token {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| presented == token.as_ref());
        if !authorized {
            return AppError::unauthorized().into_response();
        }
    }
    next.run(request).await
}

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn internal(message: String) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message,
        }
    }

    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "missing or invalid bearer token".to_string(),
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::StopNotFound(_)
            | Error::RouteNotFound(_)
            | Error::StopNotOnRoute { .. }
            | Error::NoConnectingRoute { .. }
            | Error::NoWalkingPath
            | Error::NoStopsNearby { .. } => StatusCode::NOT_FOUND,
            Error::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::InvalidData(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {err}");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
