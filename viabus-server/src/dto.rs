//! Request and response bodies for the routing API.
//!
//! All conversion from core planning results to JSON shapes happens here,
//! at the boundary; geometries become GeoJSON objects. Field names mirror
//! the public API contract (`stop_id`, `distance_meters`, …).

use geo::{LineString, Point};
use geojson::Geometry;
use serde::{Deserialize, Serialize};
use viabus_core::model::{
    Journey, NearestStop, RouteCandidate, RouteDetails, StopRouteEntry, WalkingSegment,
};
use viabus_core::{RouteId, StopId, WayId};

fn geometry_json(line: &LineString<f64>) -> Geometry {
    Geometry::new(line.into())
}

/// A WGS84 point as the API expresses it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationPoint {
    pub lat: f64,
    pub lng: f64,
}

impl From<LocationPoint> for Point<f64> {
    fn from(p: LocationPoint) -> Self {
        Point::new(p.lng, p.lat)
    }
}

impl From<Point<f64>> for LocationPoint {
    fn from(p: Point<f64>) -> Self {
        Self {
            lat: p.y(),
            lng: p.x(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NearestStopsQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_max_distance() -> f64 {
    viabus_core::DEFAULT_MAX_WALK_DISTANCE
}

fn default_limit() -> usize {
    viabus_core::DEFAULT_CANDIDATE_STOPS
}

#[derive(Debug, Serialize)]
pub struct NearestStopDto {
    pub stop_id: StopId,
    pub stop_name: Option<String>,
    pub distance_meters: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&NearestStop> for NearestStopDto {
    fn from(s: &NearestStop) -> Self {
        Self {
            stop_id: s.stop_id,
            stop_name: s.name.clone(),
            distance_meters: s.distance_meters,
            latitude: s.location.y(),
            longitude: s.location.x(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoutesBetweenQuery {
    pub start_stop_id: StopId,
    pub end_stop_id: StopId,
}

#[derive(Debug, Serialize)]
pub struct RouteCandidateDto {
    pub route_id: RouteId,
    pub route_name: String,
    pub route_type: String,
    pub is_direct: bool,
    pub start_sequence: Option<usize>,
    pub end_sequence: Option<usize>,
    pub distance_meters: Option<f64>,
}

impl From<&RouteCandidate> for RouteCandidateDto {
    fn from(c: &RouteCandidate) -> Self {
        Self {
            route_id: c.route_id,
            route_name: c.route_name.clone(),
            route_type: c.route_type.clone(),
            is_direct: c.is_direct,
            start_sequence: c.start_sequence,
            end_sequence: c.end_sequence,
            distance_meters: c.distance_meters,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteDetailsQuery {
    pub start_stop_id: Option<StopId>,
    pub end_stop_id: Option<StopId>,
}

#[derive(Debug, Serialize)]
pub struct RouteStopDto {
    pub sequence: usize,
    pub stop_id: StopId,
    pub stop_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct RouteDetailsDto {
    pub route_id: RouteId,
    pub route_name: String,
    pub route_type: String,
    pub total_distance_meters: f64,
    pub estimated_time_seconds: f64,
    pub geometry: Geometry,
    pub stops: Vec<RouteStopDto>,
}

impl From<&RouteDetails> for RouteDetailsDto {
    fn from(d: &RouteDetails) -> Self {
        Self {
            route_id: d.route_id,
            route_name: d.route_name.clone(),
            route_type: d.route_type.clone(),
            total_distance_meters: d.total_distance_meters,
            estimated_time_seconds: d.estimated_time_seconds,
            geometry: geometry_json(&d.geometry),
            stops: d
                .stops
                .iter()
                .map(|s| RouteStopDto {
                    sequence: s.sequence,
                    stop_id: s.stop_id,
                    stop_name: s.name.clone(),
                    latitude: s.location.y(),
                    longitude: s.location.x(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalkingSegmentDto {
    pub seq: usize,
    pub way_id: Option<WayId>,
    pub way_name: Option<String>,
    pub length_meters: f64,
    pub cost: f64,
    pub geometry: Geometry,
}

impl From<&WalkingSegment> for WalkingSegmentDto {
    fn from(s: &WalkingSegment) -> Self {
        Self {
            seq: s.sequence,
            way_id: s.way_id,
            way_name: s.way_name.clone(),
            length_meters: s.length_meters,
            cost: s.cost,
            geometry: geometry_json(&s.geometry),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlanJourneyParams {
    pub max_walk_distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanJourneyRequest {
    pub start: LocationPoint,
    pub end: LocationPoint,
}

#[derive(Debug, Serialize)]
pub struct JourneyDto {
    pub start_location: LocationPoint,
    pub end_location: LocationPoint,
    pub nearest_start_stops: Vec<NearestStopDto>,
    pub nearest_end_stops: Vec<NearestStopDto>,
    pub direct_routes: Vec<RouteCandidateDto>,
    pub has_direct_route: bool,
    pub walking_to_start: Option<Vec<WalkingSegmentDto>>,
    pub walking_from_end: Option<Vec<WalkingSegmentDto>>,
}

impl From<&Journey> for JourneyDto {
    fn from(j: &Journey) -> Self {
        let segments =
            |legs: &Option<Vec<WalkingSegment>>| -> Option<Vec<WalkingSegmentDto>> {
                legs.as_ref()
                    .map(|segs| segs.iter().map(WalkingSegmentDto::from).collect())
            };
        Self {
            start_location: j.start.into(),
            end_location: j.end.into(),
            nearest_start_stops: j.nearest_start_stops.iter().map(Into::into).collect(),
            nearest_end_stops: j.nearest_end_stops.iter().map(Into::into).collect(),
            direct_routes: j.direct_routes.iter().map(Into::into).collect(),
            has_direct_route: j.has_direct_route,
            walking_to_start: segments(&j.walking_to_start),
            walking_from_end: segments(&j.walking_from_end),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StopRouteDto {
    pub route_id: RouteId,
    pub route_name: String,
    pub route_type: String,
    pub stop_sequence: usize,
}

impl From<&StopRouteEntry> for StopRouteDto {
    fn from(e: &StopRouteEntry) -> Self {
        Self {
            route_id: e.route_id,
            route_name: e.route_name.clone(),
            route_type: e.route_type.clone(),
            stop_sequence: e.stop_sequence,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteTypesResponse {
    pub route_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
