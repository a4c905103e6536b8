//! Walking-path planning over the street graph

use geo::{Distance, Haversine, Point};

use crate::deadline::Deadline;
use crate::error::Error;
use crate::model::{TransitNetwork, WalkingSegment};
use crate::SAME_POINT_EPSILON;

use super::dijkstra::shortest_edge_path;

/// Compute a walking path between two points as an ordered sequence of
/// per-way segments.
///
/// The points are anchored to their nearest street-graph vertices and the
/// path is a cost-minimal Dijkstra traversal (ties broken by fewer
/// segments). Points closer than [`SAME_POINT_EPSILON`] — or anchored to
/// the same vertex — need no walking and yield an empty sequence.
///
/// # Errors
///
/// [`Error::InvalidInput`] for malformed coordinates,
/// [`Error::NoWalkingPath`] when the street graph is empty or disconnected
/// between the anchors, [`Error::DeadlineExceeded`] when the search outruns
/// its deadline.
pub fn compute_walking_route(
    network: &TransitNetwork,
    from: Point<f64>,
    to: Point<f64>,
    deadline: Deadline,
) -> Result<Vec<WalkingSegment>, Error> {
    super::validate_point(from, "from point")?;
    super::validate_point(to, "to point")?;

    if Haversine.distance(from, to) < SAME_POINT_EPSILON {
        return Ok(Vec::new());
    }

    let street = &network.street;
    let (start, _) = street.nearest_node(&from).ok_or(Error::NoWalkingPath)?;
    let (target, _) = street.nearest_node(&to).ok_or(Error::NoWalkingPath)?;

    let edges = shortest_edge_path(street, start, target, deadline)?.ok_or(Error::NoWalkingPath)?;

    let segments = edges
        .iter()
        .enumerate()
        .map(|(sequence, &edge_idx)| {
            let edge = &street.graph[edge_idx];
            let way = network.way(edge.way_id);
            WalkingSegment {
                sequence,
                way_id: Some(edge.way_id),
                way_name: way.and_then(|w| w.name.clone()),
                length_meters: edge.length_meters,
                cost: edge.cost,
                geometry: edge.geometry.clone(),
            }
        })
        .collect();
    Ok(segments)
}
