//! Journey-planning core for the viabus transit backend
//!
//! Holds the in-memory geospatial store ([`model::TransitNetwork`]) and the
//! planning operations built on top of it: nearest-stop search, direct-route
//! search between stops, route geometry assembly, walking-path search over
//! the street graph, and composition of complete journeys.

pub mod deadline;
pub mod error;
pub mod loading;
pub mod model;
pub mod planning;

pub mod prelude;

pub use deadline::Deadline;
pub use error::Error;
pub use model::{Route, Stop, StreetGraph, TransitNetwork, Way};

/// Stable identifier of a transit stop (OSM node id in the source data).
pub type StopId = i64;
/// Stable identifier of a transit route (OSM relation id).
pub type RouteId = i64;
/// Stable identifier of a street way (OSM way id).
pub type WayId = i64;
/// Identifier of a street-graph vertex (OSM node id).
pub type StreetNodeId = i64;

/// Default search radius for candidate stops, in meters.
pub const DEFAULT_MAX_WALK_DISTANCE: f64 = 500.0;

/// Default number of candidate stops considered on each journey side.
pub const DEFAULT_CANDIDATE_STOPS: usize = 5;

/// Assumed average in-service transit speed, meters per second (18 km/h).
/// Route traversal time estimates are `distance / AVERAGE_TRANSIT_SPEED`.
pub const AVERAGE_TRANSIT_SPEED: f64 = 5.0;

/// Two points closer than this are treated as the same place: no walking
/// path is computed between them.
pub const SAME_POINT_EPSILON: f64 = 1.0;

/// Default budget for a single planning sub-call.
pub const SUB_CALL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
