//! Direct-route search between two stops

use crate::deadline::Deadline;
use crate::error::Error;
use crate::model::{RouteCandidate, StopRouteEntry, TransitNetwork};
use crate::StopId;

/// Find every route serving both stops, with sequence positions, the direct
/// flag and the on-route distance between the positions.
///
/// Directionality policy: a bidirectional route is direct whenever the two
/// sequence positions differ; a one-way route only when travel runs in
/// increasing sequence order (`start_seq < end_seq`). Routes serving both
/// stops but failing the policy are still returned with `is_direct = false`.
///
/// Ordering: ascending distance, ties by route id.
///
/// # Errors
///
/// [`Error::StopNotFound`] for an unknown stop id,
/// [`Error::NoConnectingRoute`] when no route serves both stops (the journey
/// composer absorbs this per stop pair), [`Error::DeadlineExceeded`] when
/// the sub-call deadline expires mid-scan.
pub fn find_routes_between_stops(
    network: &TransitNetwork,
    start_stop: StopId,
    end_stop: StopId,
    deadline: Deadline,
) -> Result<Vec<RouteCandidate>, Error> {
    if network.stop(start_stop).is_none() {
        return Err(Error::StopNotFound(start_stop));
    }
    if network.stop(end_stop).is_none() {
        return Err(Error::StopNotFound(end_stop));
    }

    let serving_end = network.routes_serving(end_stop);
    let mut candidates = Vec::new();

    for &route_id in network.routes_serving(start_stop) {
        deadline.check("route search")?;
        if !serving_end.contains(&route_id) {
            continue;
        }
        let route = network.route(route_id).expect("index references valid route");
        let (Some(start_seq), Some(end_seq)) =
            (route.stop_position(start_stop), route.stop_position(end_stop))
        else {
            continue;
        };
        if start_seq == end_seq {
            continue;
        }

        let is_direct = if route.oneway {
            start_seq < end_seq
        } else {
            true
        };
        let distance = network
            .route_path(route_id)
            .and_then(|path| path.distance_between_stops(start_seq, end_seq));

        candidates.push(RouteCandidate {
            route_id,
            route_name: route.name.clone(),
            route_type: route.route_type.clone(),
            is_direct,
            start_sequence: Some(start_seq),
            end_sequence: Some(end_seq),
            distance_meters: distance,
        });
    }

    if candidates.is_empty() {
        return Err(Error::NoConnectingRoute {
            start: start_stop,
            end: end_stop,
        });
    }

    candidates.sort_by(|a, b| {
        let da = a.distance_meters.unwrap_or(f64::INFINITY);
        let db = b.distance_meters.unwrap_or(f64::INFINITY);
        da.total_cmp(&db).then(a.route_id.cmp(&b.route_id))
    });
    Ok(candidates)
}

/// All routes serving a stop, with the stop's sequence position on each,
/// ordered by route id.
///
/// # Errors
///
/// [`Error::StopNotFound`] for an unknown stop id. A known stop served by
/// no route yields an empty vector.
pub fn routes_at_stop(
    network: &TransitNetwork,
    stop_id: StopId,
) -> Result<Vec<StopRouteEntry>, Error> {
    if network.stop(stop_id).is_none() {
        return Err(Error::StopNotFound(stop_id));
    }

    let mut entries: Vec<StopRouteEntry> = network
        .routes_serving(stop_id)
        .iter()
        .filter_map(|&route_id| {
            let route = network.route(route_id)?;
            let sequence = route.stop_position(stop_id)?;
            Some(StopRouteEntry {
                route_id,
                route_name: route.name.clone(),
                route_type: route.route_type.clone(),
                stop_sequence: sequence,
            })
        })
        .collect();
    entries.sort_by_key(|e| e.route_id);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::NetworkBuilder;

    /// One street of five ~85 m ways; route 14 runs the full street both
    /// ways, route 21 runs one-way over the same street.
    fn fixture() -> TransitNetwork {
        let mut builder = NetworkBuilder::new();
        builder.add_stop(101, Some("First".to_string()), 40.0, -75.0);
        builder.add_stop(102, Some("Mid".to_string()), 40.0, -74.998);
        builder.add_stop(103, Some("Last".to_string()), 40.0, -74.995);
        builder.add_stop(104, Some("Elsewhere".to_string()), 40.1, -75.0);
        for i in 0..5 {
            let x0 = -75.0 + 0.001 * f64::from(i);
            let x1 = x0 + 0.001;
            builder.add_way(
                i64::from(i) + 1,
                None,
                Some("residential".to_string()),
                i64::from(i) + 10,
                i64::from(i) + 11,
                85.0,
                85.0,
                vec![(x0, 40.0), (x1, 40.0)],
            );
        }
        builder.add_route(14, "R14", "bus", false, vec![1, 2, 3, 4, 5], vec![101, 102, 103]);
        builder.add_route(21, "R21", "minibus", true, vec![1, 2, 3, 4, 5], vec![101, 103]);
        builder.build().unwrap()
    }

    #[test]
    fn finds_all_serving_routes_ordered_by_distance() {
        let network = fixture();
        let found = find_routes_between_stops(&network, 101, 103, Deadline::none()).unwrap();
        assert_eq!(found.len(), 2);
        // Both run the same path, equal distance; tie broken by route id.
        assert_eq!(found[0].route_id, 14);
        assert_eq!(found[1].route_id, 21);
        assert!(found.iter().all(|c| c.is_direct));
        assert_eq!(found[0].start_sequence, Some(0));
        assert_eq!(found[0].end_sequence, Some(2));
    }

    #[test]
    fn distance_matches_route_geometry_between_positions() {
        let network = fixture();
        let found = find_routes_between_stops(&network, 101, 102, Deadline::none()).unwrap();
        let r14 = found.iter().find(|c| c.route_id == 14).unwrap();
        let path = network.route_path(14).unwrap();
        let expected = path.distance_between_stops(0, 1).unwrap();
        let got = r14.distance_meters.unwrap();
        assert!((got - expected).abs() / expected < 1e-3);
        // Two ~85 m ways between stop 101 and stop 102
        assert!(got > 150.0 && got < 200.0, "got {got}");
    }

    #[test]
    fn oneway_route_is_not_direct_in_reverse() {
        let network = fixture();
        let reverse = find_routes_between_stops(&network, 103, 101, Deadline::none()).unwrap();
        let r21 = reverse.iter().find(|c| c.route_id == 21).unwrap();
        assert!(!r21.is_direct);
        // The bidirectional route still qualifies in either order.
        let r14 = reverse.iter().find(|c| c.route_id == 14).unwrap();
        assert!(r14.is_direct);
    }

    #[test]
    fn no_common_route_is_a_typed_error() {
        let network = fixture();
        assert!(matches!(
            find_routes_between_stops(&network, 101, 104, Deadline::none()),
            Err(Error::NoConnectingRoute { start: 101, end: 104 })
        ));
    }

    #[test]
    fn unknown_stop_is_not_found() {
        let network = fixture();
        assert!(matches!(
            find_routes_between_stops(&network, 555, 101, Deadline::none()),
            Err(Error::StopNotFound(555))
        ));
    }

    #[test]
    fn expired_deadline_surfaces_as_timeout() {
        let network = fixture();
        let expired = Deadline::after(std::time::Duration::ZERO);
        assert!(matches!(
            find_routes_between_stops(&network, 101, 103, expired),
            Err(Error::DeadlineExceeded(_))
        ));
    }

    #[test]
    fn routes_at_stop_lists_sequences() {
        let network = fixture();
        let entries = routes_at_stop(&network, 103).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].route_id, 14);
        assert_eq!(entries[0].stop_sequence, 2);
        assert_eq!(entries[1].route_id, 21);
        assert_eq!(entries[1].stop_sequence, 1);

        let unserved = routes_at_stop(&network, 104).unwrap();
        assert!(unserved.is_empty());

        assert!(matches!(
            routes_at_stop(&network, 777),
            Err(Error::StopNotFound(777))
        ));
    }
}
