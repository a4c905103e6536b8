pub use crate::{
    AVERAGE_TRANSIT_SPEED, DEFAULT_CANDIDATE_STOPS, DEFAULT_MAX_WALK_DISTANCE, SAME_POINT_EPSILON,
};

// Re-export key components
pub use crate::loading::{NetworkBuilder, load_network};
pub use crate::model::{Route, Stop, TransitNetwork, Way};
pub use crate::planning::journey::{PlanningConfig, plan_journey};
pub use crate::planning::route_connector::{find_routes_between_stops, routes_at_stop};
pub use crate::planning::route_details::route_details;
pub use crate::planning::stop_locator::find_nearest_stops;
pub use crate::planning::walking::compute_walking_route;

// Core identifier types
pub use crate::RouteId;
pub use crate::StopId;
pub use crate::StreetNodeId;
pub use crate::WayId;

pub use crate::deadline::Deadline;
pub use crate::error::Error;
