//! Journey composition
//!
//! Orchestrates the leaf queries into one coherent journey: candidate stops
//! around both endpoints, direct routes across every candidate pair, and
//! optional walking legs bridging the endpoints to their nearest stops.

use std::time::Duration;

use geo::Point;
use hashbrown::HashMap;
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;

use crate::deadline::{Deadline, retry_once};
use crate::error::{Error, JourneySide};
use crate::model::{Journey, NearestStop, RouteCandidate, TransitNetwork, WalkingSegment};
use crate::{DEFAULT_CANDIDATE_STOPS, DEFAULT_MAX_WALK_DISTANCE, RouteId, SUB_CALL_TIMEOUT};

use super::{compute_walking_route, find_nearest_stops, find_routes_between_stops};

/// Tunables for journey composition.
#[derive(Debug, Clone)]
pub struct PlanningConfig {
    /// Search radius around each endpoint, meters. Also bounds walking legs.
    pub max_walk_distance: f64,
    /// Candidate stops considered per endpoint; bounds pair fan-out.
    pub candidate_stops: usize,
    /// Budget for each store-touching sub-call.
    pub sub_call_timeout: Duration,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            max_walk_distance: DEFAULT_MAX_WALK_DISTANCE,
            candidate_stops: DEFAULT_CANDIDATE_STOPS,
            sub_call_timeout: SUB_CALL_TIMEOUT,
        }
    }
}

impl PlanningConfig {
    pub fn with_max_walk_distance(max_walk_distance: f64) -> Self {
        Self {
            max_walk_distance,
            ..Self::default()
        }
    }
}

/// Plan a complete journey between two points.
///
/// Candidate stops are located around both endpoints concurrently; a side
/// with no stop in range fails the whole request with
/// [`Error::NoStopsNearby`]. Direct routes are searched across every
/// (start candidate, end candidate) pair in parallel — a pair with no
/// connecting route is absorbed, not an error — then deduplicated by route
/// keeping the shortest on-route distance. Walking legs go from the start
/// point to its single nearest stop and from the end side's nearest stop to
/// the end point; when a leg cannot be computed (disconnected graph, timed
/// out after retry) it degrades to `None` instead of failing the journey.
pub fn plan_journey(
    network: &TransitNetwork,
    start: Point<f64>,
    end: Point<f64>,
    config: &PlanningConfig,
) -> Result<Journey, Error> {
    super::validate_point(start, "start point")?;
    super::validate_point(end, "end point")?;

    let (start_stops, end_stops) = rayon::join(
        || find_nearest_stops(network, start, config.max_walk_distance, config.candidate_stops),
        || find_nearest_stops(network, end, config.max_walk_distance, config.candidate_stops),
    );
    let (start_stops, end_stops) = (start_stops?, end_stops?);

    if start_stops.is_empty() {
        return Err(Error::NoStopsNearby {
            side: JourneySide::Start,
            radius_meters: config.max_walk_distance,
        });
    }
    if end_stops.is_empty() {
        return Err(Error::NoStopsNearby {
            side: JourneySide::End,
            radius_meters: config.max_walk_distance,
        });
    }

    let direct_routes = collect_direct_routes(network, &start_stops, &end_stops, config)?;
    let has_direct_route = !direct_routes.is_empty();

    let (walking_to_start, walking_from_end) = rayon::join(
        || walking_leg(network, start, start_stops[0].location, config, "start leg"),
        || walking_leg(network, end_stops[0].location, end, config, "end leg"),
    );

    Ok(Journey {
        start,
        end,
        nearest_start_stops: start_stops,
        nearest_end_stops: end_stops,
        direct_routes,
        has_direct_route,
        walking_to_start: walking_to_start?,
        walking_from_end: walking_from_end?,
    })
}

/// Search all candidate pairs for direct routes, absorbing per-pair misses,
/// deduplicating by route with the shortest distance kept.
fn collect_direct_routes(
    network: &TransitNetwork,
    start_stops: &[NearestStop],
    end_stops: &[NearestStop],
    config: &PlanningConfig,
) -> Result<Vec<RouteCandidate>, Error> {
    let pairs: Vec<(i64, i64)> = start_stops
        .iter()
        .map(|s| s.stop_id)
        .cartesian_product(end_stops.iter().map(|e| e.stop_id))
        .filter(|(s, e)| s != e)
        .collect();

    let per_pair: Vec<Vec<RouteCandidate>> = pairs
        .par_iter()
        .map(|&(start_id, end_id)| {
            let deadline = Deadline::after(config.sub_call_timeout);
            match retry_once(deadline, |d| {
                find_routes_between_stops(network, start_id, end_id, d)
            }) {
                Ok(candidates) => Ok(candidates.into_iter().filter(|c| c.is_direct).collect()),
                Err(e) if e.is_degradable() => {
                    debug!("pair ({start_id}, {end_id}): {e}");
                    Ok(Vec::new())
                }
                Err(e) => Err(e),
            }
        })
        .collect::<Result<_, Error>>()?;

    let mut best: HashMap<RouteId, RouteCandidate> = HashMap::new();
    for candidate in per_pair.into_iter().flatten() {
        match best.get(&candidate.route_id) {
            Some(kept)
                if kept.distance_meters.unwrap_or(f64::INFINITY)
                    <= candidate.distance_meters.unwrap_or(f64::INFINITY) => {}
            _ => {
                best.insert(candidate.route_id, candidate);
            }
        }
    }

    let mut routes: Vec<RouteCandidate> = best.into_values().collect();
    routes.sort_by(|a, b| {
        let da = a.distance_meters.unwrap_or(f64::INFINITY);
        let db = b.distance_meters.unwrap_or(f64::INFINITY);
        da.total_cmp(&db).then(a.route_id.cmp(&b.route_id))
    });
    Ok(routes)
}

/// Compute one optional walking leg; disconnection and post-retry timeouts
/// degrade to `None`.
fn walking_leg(
    network: &TransitNetwork,
    from: Point<f64>,
    to: Point<f64>,
    config: &PlanningConfig,
    what: &str,
) -> Result<Option<Vec<WalkingSegment>>, Error> {
    let deadline = Deadline::after(config.sub_call_timeout);
    match retry_once(deadline, |d| compute_walking_route(network, from, to, d)) {
        Ok(segments) => Ok(Some(segments)),
        Err(e) if e.is_degradable() => {
            debug!("{what} degraded: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::NetworkBuilder;

    fn fixture() -> TransitNetwork {
        let mut builder = NetworkBuilder::new();
        builder.add_stop(101, Some("West".to_string()), 40.0, -74.999);
        builder.add_stop(102, Some("East".to_string()), 40.0, -74.996);
        for i in 0..5 {
            let x0 = -75.0 + 0.001 * f64::from(i);
            builder.add_way(
                i64::from(i) + 1,
                None,
                Some("residential".to_string()),
                i64::from(i) + 10,
                i64::from(i) + 11,
                85.0,
                85.0,
                vec![(x0, 40.0), (x0 + 0.001, 40.0)],
            );
        }
        builder.add_route(14, "R14", "bus", false, vec![2, 3, 4], vec![101, 102]);
        builder.build().unwrap()
    }

    #[test]
    fn plans_a_direct_journey_with_walking_legs() {
        let network = fixture();
        let journey = plan_journey(
            &network,
            Point::new(-75.0, 40.0),
            Point::new(-74.995, 40.0),
            &PlanningConfig::default(),
        )
        .unwrap();

        assert!(journey.has_direct_route);
        assert_eq!(journey.direct_routes.len(), 1);
        assert_eq!(journey.direct_routes[0].route_id, 14);
        assert_eq!(journey.nearest_start_stops[0].stop_id, 101);
        assert_eq!(journey.nearest_end_stops[0].stop_id, 102);

        // One way separates each endpoint from its nearest stop.
        let to_start = journey.walking_to_start.as_ref().unwrap();
        assert_eq!(to_start.len(), 1);
        assert_eq!(to_start[0].way_id, Some(1));
        let from_end = journey.walking_from_end.as_ref().unwrap();
        assert_eq!(from_end.len(), 1);
        assert_eq!(from_end[0].way_id, Some(5));
    }

    #[test]
    fn no_stops_near_start_fails_the_request() {
        let network = fixture();
        let result = plan_journey(
            &network,
            Point::new(-80.0, 40.0),
            Point::new(-74.995, 40.0),
            &PlanningConfig::default(),
        );
        assert!(matches!(
            result,
            Err(Error::NoStopsNearby {
                side: JourneySide::Start,
                ..
            })
        ));
    }

    #[test]
    fn flag_matches_candidate_set() {
        let network = fixture();
        // Start and end both near stop 101 only: the sole candidate pair is
        // filtered out (same stop on both sides), so no direct route.
        let journey = plan_journey(
            &network,
            Point::new(-75.0, 40.0),
            Point::new(-74.9985, 40.0),
            &PlanningConfig::with_max_walk_distance(150.0),
        )
        .unwrap();
        assert!(!journey.has_direct_route);
        assert!(journey.direct_routes.is_empty());
    }
}
