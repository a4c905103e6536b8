//! The in-process geospatial store
//!
//! [`TransitNetwork`] holds all reference data behind spatial and relational
//! indices: an R-tree over stops for proximity search, a directed street
//! graph with an R-tree over its nodes for walking-path search, and
//! precomputed per-route paths with cumulative distance measures so on-route
//! distances are a subtraction rather than a traversal.

use geo::{Coord, Distance, Haversine, LineString, Point};
use hashbrown::HashMap;
use petgraph::graph::{Graph, NodeIndex};
use rstar::{RTree, primitives::GeomWithData};

use crate::{RouteId, StopId, StreetNodeId, WayId};

use super::types::{Route, Stop, Way};

/// Street graph vertex.
#[derive(Debug, Clone)]
pub struct StreetNode {
    pub id: StreetNodeId,
    pub geometry: Point<f64>,
}

/// Street graph edge: one usable direction of a way.
#[derive(Debug, Clone)]
pub struct StreetEdge {
    pub way_id: WayId,
    /// Directional traversal cost (non-negative once inserted).
    pub cost: f64,
    pub length_meters: f64,
    /// Geometry oriented in this edge's travel direction.
    pub geometry: LineString<f64>,
}

/// Directed pedestrian/road graph with a spatial index over its vertices.
pub struct StreetGraph {
    pub graph: Graph<StreetNode, StreetEdge>,
    pub(crate) node_index: RTree<GeomWithData<[f64; 2], NodeIndex>>,
    pub(crate) node_lookup: HashMap<StreetNodeId, NodeIndex>,
}

impl StreetGraph {
    /// Nearest graph vertex to a point, with its haversine distance in
    /// meters. `None` when the graph is empty.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        let hit = self.node_index.nearest_neighbor(&[point.x(), point.y()])?;
        let node = hit.data;
        let distance = Haversine.distance(*point, self.graph[node].geometry);
        Some((node, distance))
    }

    /// Graph vertex for an external street-node identifier.
    pub fn node_by_id(&self, id: StreetNodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// A route's flattened path with cumulative haversine measures, plus the
/// measure at each stop sequence position.
#[derive(Debug, Clone)]
pub struct RoutePath {
    pub(crate) coords: Vec<Coord<f64>>,
    /// `cumulative[i]` is the path distance in meters from the first vertex
    /// to `coords[i]`; same length as `coords`.
    pub(crate) cumulative: Vec<f64>,
    /// Distance along the path at each stop sequence position.
    pub(crate) stop_measures: Vec<f64>,
}

impl RoutePath {
    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn stop_measure(&self, sequence: usize) -> Option<f64> {
        self.stop_measures.get(sequence).copied()
    }

    /// On-route distance between two stop sequence positions.
    pub fn distance_between_stops(&self, a: usize, b: usize) -> Option<f64> {
        let ma = self.stop_measure(a)?;
        let mb = self.stop_measure(b)?;
        Some((mb - ma).abs())
    }

    /// The sub-path between two measures as a linestring. Bounds are
    /// clamped to the path and normalized so `from <= to`.
    pub fn slice(&self, from: f64, to: f64) -> LineString<f64> {
        let total = self.total_length();
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let from = from.clamp(0.0, total);
        let to = to.clamp(0.0, total);

        let mut coords = vec![self.point_at(from)];
        for (c, &m) in self.coords.iter().zip(&self.cumulative) {
            if m > from && m < to {
                coords.push(*c);
            }
        }
        coords.push(self.point_at(to));
        coords.dedup_by(|a, b| (a.x - b.x).abs() < 1e-12 && (a.y - b.y).abs() < 1e-12);
        // A degenerate slice still needs two vertices to be a valid line.
        if coords.len() == 1 {
            coords.push(coords[0]);
        }
        LineString::new(coords)
    }

    pub fn full_linestring(&self) -> LineString<f64> {
        LineString::new(self.coords.clone())
    }

    /// Interpolated point at a measure along the path.
    fn point_at(&self, measure: f64) -> Coord<f64> {
        debug_assert!(!self.coords.is_empty());
        if measure <= 0.0 {
            return self.coords[0];
        }
        for window in 0..self.cumulative.len() - 1 {
            let (m0, m1) = (self.cumulative[window], self.cumulative[window + 1]);
            if measure <= m1 {
                let span = m1 - m0;
                let t = if span > 0.0 { (measure - m0) / span } else { 0.0 };
                let (a, b) = (self.coords[window], self.coords[window + 1]);
                return Coord {
                    x: a.x + (b.x - a.x) * t,
                    y: a.y + (b.y - a.y) * t,
                };
            }
        }
        *self.coords.last().expect("route path has vertices")
    }
}

/// The complete in-memory transit network. Built once by
/// [`crate::loading::NetworkBuilder`], read-only afterwards.
pub struct TransitNetwork {
    pub(crate) stops: HashMap<StopId, Stop>,
    pub(crate) routes: HashMap<RouteId, Route>,
    pub(crate) ways: HashMap<WayId, Way>,
    pub(crate) routes_by_stop: HashMap<StopId, Vec<RouteId>>,
    pub(crate) stop_index: RTree<GeomWithData<[f64; 2], StopId>>,
    pub(crate) route_paths: HashMap<RouteId, RoutePath>,
    pub street: StreetGraph,
}

impl TransitNetwork {
    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(&id)
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    pub fn way(&self, id: WayId) -> Option<&Way> {
        self.ways.get(&id)
    }

    /// Routes serving the given stop, in load order.
    pub fn routes_serving(&self, stop: StopId) -> &[RouteId] {
        self.routes_by_stop
            .get(&stop)
            .map_or(&[], |ids| ids.as_slice())
    }

    pub fn route_path(&self, id: RouteId) -> Option<&RoutePath> {
        self.route_paths.get(&id)
    }

    /// Distinct route types present in the network, sorted.
    pub fn route_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .routes
            .values()
            .map(|r| r.route_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }
}

/// Haversine length of a coordinate sequence, in meters.
pub(crate) fn path_length_meters(coords: &[Coord<f64>]) -> f64 {
    coords
        .windows(2)
        .map(|w| Haversine.distance(Point::from(w[0]), Point::from(w[1])))
        .sum()
}
