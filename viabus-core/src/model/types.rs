//! Reference entities and per-request planning results

use geo::{LineString, Point};

use crate::{RouteId, StopId, StreetNodeId, WayId};

/// A transit stop. Immutable reference data: created at load time, never
/// mutated by the planning core.
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: StopId,
    pub name: Option<String>,
    /// WGS84 location (x = longitude, y = latitude).
    pub geometry: Point<f64>,
}

/// A street segment usable as a graph edge.
///
/// Traversal costs follow the pgRouting convention:
/// `cost` applies source→target, `reverse_cost` target→source, and a
/// negative value disables that direction entirely.
#[derive(Debug, Clone)]
pub struct Way {
    pub id: WayId,
    pub name: Option<String>,
    pub highway: Option<String>,
    pub source: StreetNodeId,
    pub target: StreetNodeId,
    pub cost: f64,
    pub reverse_cost: f64,
    pub length_meters: f64,
    pub geometry: LineString<f64>,
}

/// A transit route: an ordered sequence of ways forming its path and an
/// ordered sequence of stops it serves. Vector order is the sequence
/// position for both.
#[derive(Debug, Clone)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub route_type: String,
    /// Direction-only service: travel is valid only in increasing stop
    /// sequence order.
    pub oneway: bool,
    /// Ways composing the path, in traversal order. A way may appear more
    /// than once when the route re-traverses it.
    pub way_ids: Vec<WayId>,
    /// Stops served, in travel order.
    pub stops: Vec<StopId>,
}

impl Route {
    /// Sequence position of the first occurrence of `stop` on this route.
    pub fn stop_position(&self, stop: StopId) -> Option<usize> {
        self.stops.iter().position(|&s| s == stop)
    }
}

/// A stop with its computed distance from a query point.
#[derive(Debug, Clone)]
pub struct NearestStop {
    pub stop_id: StopId,
    pub name: Option<String>,
    pub distance_meters: f64,
    pub location: Point<f64>,
}

/// A route serving two queried stops.
#[derive(Debug, Clone)]
pub struct RouteCandidate {
    pub route_id: RouteId,
    pub route_name: String,
    pub route_type: String,
    /// Whether the route can carry a passenger from the start stop to the
    /// end stop without transfer, honoring one-way service direction.
    pub is_direct: bool,
    pub start_sequence: Option<usize>,
    pub end_sequence: Option<usize>,
    /// On-route distance between the two sequence positions.
    pub distance_meters: Option<f64>,
}

/// One stop along a (sub-)route, in sequence order.
#[derive(Debug, Clone)]
pub struct RouteStopInfo {
    pub sequence: usize,
    pub stop_id: StopId,
    pub name: Option<String>,
    pub location: Point<f64>,
}

/// Assembled route geometry between optional stop bounds.
#[derive(Debug, Clone)]
pub struct RouteDetails {
    pub route_id: RouteId,
    pub route_name: String,
    pub route_type: String,
    pub total_distance_meters: f64,
    pub estimated_time_seconds: f64,
    pub geometry: LineString<f64>,
    pub stops: Vec<RouteStopInfo>,
}

/// One ordered step of a walking path.
#[derive(Debug, Clone)]
pub struct WalkingSegment {
    pub sequence: usize,
    pub way_id: Option<WayId>,
    pub way_name: Option<String>,
    pub length_meters: f64,
    pub cost: f64,
    pub geometry: LineString<f64>,
}

/// A route serving a queried stop, with the stop's sequence position.
#[derive(Debug, Clone)]
pub struct StopRouteEntry {
    pub route_id: RouteId,
    pub route_name: String,
    pub route_type: String,
    pub stop_sequence: usize,
}

/// The composed journey response.
#[derive(Debug, Clone)]
pub struct Journey {
    pub start: Point<f64>,
    pub end: Point<f64>,
    pub nearest_start_stops: Vec<NearestStop>,
    pub nearest_end_stops: Vec<NearestStop>,
    pub direct_routes: Vec<RouteCandidate>,
    pub has_direct_route: bool,
    /// Walking leg from the start point to its nearest stop. `None` when it
    /// could not be computed (degraded), `Some(vec![])` when no walking is
    /// needed.
    pub walking_to_start: Option<Vec<WalkingSegment>>,
    /// Walking leg from the nearest end-side stop to the end point.
    pub walking_from_end: Option<Vec<WalkingSegment>>,
}
