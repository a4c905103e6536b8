//! Planning operations over the transit network
//!
//! Leaf queries (stop locator, route connector, route details, walking
//! planner) plus the journey composer that orchestrates them.

pub mod dijkstra;
pub mod journey;
pub mod route_connector;
pub mod route_details;
pub mod stop_locator;
pub mod walking;

pub use journey::{PlanningConfig, plan_journey};
pub use route_connector::{find_routes_between_stops, routes_at_stop};
pub use route_details::route_details;
pub use stop_locator::find_nearest_stops;
pub use walking::compute_walking_route;

use geo::Point;

use crate::error::Error;

/// Reject malformed WGS84 coordinates before touching the store.
pub(crate) fn validate_point(point: Point<f64>, what: &str) -> Result<(), Error> {
    let (lng, lat) = (point.x(), point.y());
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidInput(format!(
            "{what}: latitude {lat} out of range [-90, 90]"
        )));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(Error::InvalidInput(format!(
            "{what}: longitude {lng} out of range [-180, 180]"
        )));
    }
    Ok(())
}
