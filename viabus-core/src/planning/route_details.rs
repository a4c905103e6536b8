//! Route geometry assembly

use geo::Point;

use crate::error::Error;
use crate::model::{RouteDetails, RouteStopInfo, TransitNetwork};
use crate::{AVERAGE_TRANSIT_SPEED, RouteId, StopId};

/// Assemble a route's path geometry, cumulative distance, traversal time
/// estimate and ordered stop list.
///
/// With both stop bounds given, only the sub-path between their sequence
/// positions is returned (direction normalized); otherwise the full route.
/// The time estimate is `distance / AVERAGE_TRANSIT_SPEED` (5 m/s).
///
/// # Errors
///
/// [`Error::RouteNotFound`] for an unknown route,
/// [`Error::StopNotOnRoute`] when a bound stop is not served by the route.
pub fn route_details(
    network: &TransitNetwork,
    route_id: RouteId,
    start_stop: Option<StopId>,
    end_stop: Option<StopId>,
) -> Result<RouteDetails, Error> {
    let route = network
        .route(route_id)
        .ok_or(Error::RouteNotFound(route_id))?;
    let path = network
        .route_path(route_id)
        .ok_or(Error::RouteNotFound(route_id))?;

    let bounds = match (start_stop, end_stop) {
        (Some(start), Some(end)) => {
            let start_seq = route
                .stop_position(start)
                .ok_or(Error::StopNotOnRoute { stop: start, route: route_id })?;
            let end_seq = route
                .stop_position(end)
                .ok_or(Error::StopNotOnRoute { stop: end, route: route_id })?;
            Some((start_seq.min(end_seq), start_seq.max(end_seq)))
        }
        // A single bound cannot define a sub-path; return the full route.
        _ => None,
    };

    let (geometry, total_distance, seq_range) = match bounds {
        Some((lo, hi)) => {
            let m_lo = path.stop_measure(lo).unwrap_or(0.0);
            let m_hi = path.stop_measure(hi).unwrap_or_else(|| path.total_length());
            (path.slice(m_lo, m_hi), (m_hi - m_lo).abs(), lo..=hi)
        }
        None => (
            path.full_linestring(),
            path.total_length(),
            0..=route.stops.len().saturating_sub(1),
        ),
    };

    let stops: Vec<RouteStopInfo> = route
        .stops
        .iter()
        .enumerate()
        .filter(|(seq, _)| seq_range.contains(seq))
        .filter_map(|(sequence, &stop_id)| {
            let stop = network.stop(stop_id)?;
            Some(RouteStopInfo {
                sequence,
                stop_id,
                name: stop.name.clone(),
                location: Point::new(stop.geometry.x(), stop.geometry.y()),
            })
        })
        .collect();

    Ok(RouteDetails {
        route_id,
        route_name: route.name.clone(),
        route_type: route.route_type.clone(),
        total_distance_meters: total_distance,
        estimated_time_seconds: total_distance / AVERAGE_TRANSIT_SPEED,
        geometry,
        stops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::NetworkBuilder;

    fn fixture() -> TransitNetwork {
        let mut builder = NetworkBuilder::new();
        builder.add_stop(101, Some("First".to_string()), 40.0, -75.0);
        builder.add_stop(102, Some("Mid".to_string()), 40.0, -74.998);
        builder.add_stop(103, Some("Last".to_string()), 40.0, -74.995);
        for i in 0..5 {
            let x0 = -75.0 + 0.001 * f64::from(i);
            builder.add_way(
                i64::from(i) + 1,
                None,
                None,
                i64::from(i) + 10,
                i64::from(i) + 11,
                85.0,
                85.0,
                vec![(x0, 40.0), (x0 + 0.001, 40.0)],
            );
        }
        builder.add_route(14, "R14", "bus", false, vec![1, 2, 3, 4, 5], vec![101, 102, 103]);
        builder.build().unwrap()
    }

    #[test]
    fn full_route_includes_all_stops_and_vertices() {
        let network = fixture();
        let details = route_details(&network, 14, None, None).unwrap();
        assert_eq!(details.route_name, "R14");
        assert_eq!(details.stops.len(), 3);
        assert_eq!(details.geometry.coords().count(), 6);
        assert!(details.total_distance_meters > 400.0);
        let expected_time = details.total_distance_meters / AVERAGE_TRANSIT_SPEED;
        assert!((details.estimated_time_seconds - expected_time).abs() < 1e-9);
    }

    #[test]
    fn bounded_route_is_the_sub_path() {
        let network = fixture();
        let details = route_details(&network, 14, Some(101), Some(102)).unwrap();
        assert_eq!(details.stops.len(), 2);
        assert_eq!(details.stops[0].sequence, 0);
        assert_eq!(details.stops[1].sequence, 1);
        // Two ~85 m ways between the bounds
        assert!(details.total_distance_meters > 150.0 && details.total_distance_meters < 200.0);
    }

    #[test]
    fn reversed_bounds_are_normalized() {
        let network = fixture();
        let forward = route_details(&network, 14, Some(101), Some(102)).unwrap();
        let backward = route_details(&network, 14, Some(102), Some(101)).unwrap();
        assert_eq!(forward.geometry, backward.geometry);
        assert_eq!(forward.total_distance_meters, backward.total_distance_meters);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let network = fixture();
        let first = route_details(&network, 14, Some(101), Some(103)).unwrap();
        let second = route_details(&network, 14, Some(101), Some(103)).unwrap();
        assert_eq!(first.geometry, second.geometry);
        assert_eq!(
            first.stops.iter().map(|s| s.stop_id).collect::<Vec<_>>(),
            second.stops.iter().map(|s| s.stop_id).collect::<Vec<_>>()
        );
        assert_eq!(first.total_distance_meters, second.total_distance_meters);
    }

    #[test]
    fn unknown_route_and_foreign_stop_are_errors() {
        let network = fixture();
        assert!(matches!(
            route_details(&network, 99, None, None),
            Err(Error::RouteNotFound(99))
        ));
        // Stop 104 is not served by route 14
        assert!(matches!(
            route_details(&network, 14, Some(101), Some(104)),
            Err(Error::StopNotOnRoute { stop: 104, route: 14 })
        ));
    }

    #[test]
    fn single_bound_returns_full_route() {
        let network = fixture();
        let full = route_details(&network, 14, None, None).unwrap();
        let one_bound = route_details(&network, 14, Some(102), None).unwrap();
        assert_eq!(full.geometry, one_bound.geometry);
        assert_eq!(full.stops.len(), one_bound.stops.len());
    }
}
