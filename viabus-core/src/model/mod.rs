//! Data model for the transit network and planning results

pub mod network;
pub mod types;

pub use network::{RoutePath, StreetEdge, StreetGraph, StreetNode, TransitNetwork};
pub use types::{
    Journey, NearestStop, Route, RouteCandidate, RouteDetails, RouteStopInfo, Stop, StopRouteEntry,
    WalkingSegment, Way,
};
