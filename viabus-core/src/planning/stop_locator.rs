//! Nearest-stop search

use geo::{Distance, Haversine, Point};
use rstar::AABB;

use crate::error::Error;
use crate::model::{NearestStop, TransitNetwork};

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Padding factor for the R-tree pre-filter window, absorbing the
/// difference between the degree envelope and true great-circle distance.
const WINDOW_PADDING: f64 = 1.5;

/// Find stops within `max_distance_meters` of `point`, ordered by ascending
/// distance (ties by stop id), truncated to `limit`.
///
/// Returns an empty vector (not an error) when no stop is in range.
///
/// # Errors
///
/// [`Error::InvalidInput`] for malformed coordinates or non-positive
/// `max_distance_meters` / `limit`; rejected before any index access.
pub fn find_nearest_stops(
    network: &TransitNetwork,
    point: Point<f64>,
    max_distance_meters: f64,
    limit: usize,
) -> Result<Vec<NearestStop>, Error> {
    super::validate_point(point, "query point")?;
    if !(max_distance_meters > 0.0) {
        return Err(Error::InvalidInput(format!(
            "max_distance must be positive, got {max_distance_meters}"
        )));
    }
    if limit == 0 {
        return Err(Error::InvalidInput("limit must be positive".to_string()));
    }

    // Coarse degree window around the point, then exact haversine filter.
    let lat_delta = max_distance_meters / METERS_PER_DEGREE * WINDOW_PADDING;
    let lng_delta = lat_delta / point.y().to_radians().cos().abs().max(0.01);
    let window = AABB::from_corners(
        [point.x() - lng_delta, point.y() - lat_delta],
        [point.x() + lng_delta, point.y() + lat_delta],
    );

    let mut results: Vec<NearestStop> = network
        .stop_index
        .locate_in_envelope(&window)
        .filter_map(|entry| {
            let stop = network.stop(entry.data)?;
            let distance = Haversine.distance(point, stop.geometry);
            (distance <= max_distance_meters).then(|| NearestStop {
                stop_id: stop.id,
                name: stop.name.clone(),
                distance_meters: distance,
                location: stop.geometry,
            })
        })
        .collect();

    results.sort_by(|a, b| {
        a.distance_meters
            .total_cmp(&b.distance_meters)
            .then(a.stop_id.cmp(&b.stop_id))
    });
    results.truncate(limit);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::NetworkBuilder;

    fn network_with_stops() -> TransitNetwork {
        let mut builder = NetworkBuilder::new();
        // ~85 m east, ~170 m east (two stops sharing a location), ~341 m east
        builder.add_stop(101, Some("A".to_string()), 40.0, -74.999);
        builder.add_stop(202, Some("Tie hi".to_string()), 40.0, -74.998);
        builder.add_stop(201, Some("Tie lo".to_string()), 40.0, -74.998);
        builder.add_stop(103, Some("D".to_string()), 40.0, -74.996);
        // Far away stop, outside any reasonable radius
        builder.add_stop(999, None, 41.0, -75.0);
        builder.build().unwrap()
    }

    #[test]
    fn results_are_sorted_bounded_and_truncated() {
        let network = network_with_stops();
        let found =
            find_nearest_stops(&network, Point::new(-75.0, 40.0), 500.0, 3).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.windows(2).all(|w| w[0].distance_meters <= w[1].distance_meters));
        assert!(found.iter().all(|s| s.distance_meters <= 500.0));
        // Equal-distance stops ordered by id ascending
        assert_eq!(found[1].stop_id, 201);
        assert_eq!(found[2].stop_id, 202);
    }

    #[test]
    fn empty_when_nothing_in_range() {
        let network = network_with_stops();
        let found = find_nearest_stops(&network, Point::new(-75.0, 45.0), 500.0, 5).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn radius_filter_is_exact() {
        let network = network_with_stops();
        // Stop 101 is ~85 m away; a 50 m radius excludes it.
        let found = find_nearest_stops(&network, Point::new(-75.0, 40.0), 50.0, 5).unwrap();
        assert!(found.is_empty());
        let found = find_nearest_stops(&network, Point::new(-75.0, 40.0), 100.0, 5).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].stop_id, 101);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let network = network_with_stops();
        assert!(matches!(
            find_nearest_stops(&network, Point::new(-75.0, 91.0), 500.0, 5),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            find_nearest_stops(&network, Point::new(-181.0, 40.0), 500.0, 5),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            find_nearest_stops(&network, Point::new(-75.0, 40.0), 0.0, 5),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            find_nearest_stops(&network, Point::new(-75.0, 40.0), 500.0, 0),
            Err(Error::InvalidInput(_))
        ));
    }
}
