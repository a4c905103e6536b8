//! Programmatic network assembly with reference validation

use geo::{Coord, Distance, Haversine, LineString, Point};
use hashbrown::HashMap;
use log::{info, warn};
use petgraph::graph::{Graph, NodeIndex};
use rstar::{RTree, primitives::GeomWithData};

use crate::error::Error;
use crate::model::network::{RoutePath, StreetEdge, StreetGraph, StreetNode, path_length_meters};
use crate::model::{Route, Stop, TransitNetwork, Way};
use crate::{RouteId, StopId, StreetNodeId, WayId};

/// Accumulates stops, ways and routes, then validates cross-references and
/// builds the indexed [`TransitNetwork`].
#[derive(Default)]
pub struct NetworkBuilder {
    stops: Vec<Stop>,
    ways: Vec<Way>,
    routes: Vec<Route>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stop(&mut self, id: StopId, name: Option<String>, lat: f64, lng: f64) -> &mut Self {
        self.stops.push(Stop {
            id,
            name,
            geometry: Point::new(lng, lat),
        });
        self
    }

    /// Add a street way. `coords` are `(lng, lat)` vertices in source→target
    /// order; the way's length is computed from them.
    #[allow(clippy::too_many_arguments)]
    pub fn add_way(
        &mut self,
        id: WayId,
        name: Option<String>,
        highway: Option<String>,
        source: StreetNodeId,
        target: StreetNodeId,
        cost: f64,
        reverse_cost: f64,
        coords: Vec<(f64, f64)>,
    ) -> &mut Self {
        let geometry = LineString::from(coords);
        let length_meters = path_length_meters(&geometry.0);
        self.ways.push(Way {
            id,
            name,
            highway,
            source,
            target,
            cost,
            reverse_cost,
            length_meters,
            geometry,
        });
        self
    }

    /// Add a route with its ordered way sequence and ordered stop list.
    pub fn add_route(
        &mut self,
        id: RouteId,
        name: impl Into<String>,
        route_type: impl Into<String>,
        oneway: bool,
        way_ids: Vec<WayId>,
        stops: Vec<StopId>,
    ) -> &mut Self {
        self.routes.push(Route {
            id,
            name: name.into(),
            route_type: route_type.into(),
            oneway,
            way_ids,
            stops,
        });
        self
    }

    /// Validate and build the network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] on duplicate identifiers, out-of-range
    /// coordinates, degenerate way geometry, or dangling references.
    pub fn build(self) -> Result<TransitNetwork, Error> {
        let mut stops = HashMap::with_capacity(self.stops.len());
        for stop in self.stops {
            let (lng, lat) = (stop.geometry.x(), stop.geometry.y());
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(Error::InvalidData(format!(
                    "stop {} has out-of-range coordinates ({lat}, {lng})",
                    stop.id
                )));
            }
            if stops.insert(stop.id, stop).is_some() {
                return Err(Error::InvalidData("duplicate stop id".to_string()));
            }
        }

        let mut ways = HashMap::with_capacity(self.ways.len());
        for way in self.ways {
            if way.geometry.0.len() < 2 {
                return Err(Error::InvalidData(format!(
                    "way {} has fewer than two vertices",
                    way.id
                )));
            }
            let id = way.id;
            if ways.insert(id, way).is_some() {
                return Err(Error::InvalidData(format!("duplicate way id {id}")));
            }
        }

        let mut routes = HashMap::with_capacity(self.routes.len());
        let mut routes_by_stop: HashMap<StopId, Vec<RouteId>> = HashMap::new();
        for route in &self.routes {
            if route.way_ids.is_empty() {
                return Err(Error::InvalidData(format!(
                    "route {} has no ways in its path",
                    route.id
                )));
            }
            for way_id in &route.way_ids {
                if !ways.contains_key(way_id) {
                    return Err(Error::InvalidData(format!(
                        "route {} references unknown way {way_id}",
                        route.id
                    )));
                }
            }
            for stop_id in &route.stops {
                if !stops.contains_key(stop_id) {
                    return Err(Error::InvalidData(format!(
                        "route {} references unknown stop {stop_id}",
                        route.id
                    )));
                }
                let serving = routes_by_stop.entry(*stop_id).or_default();
                if !serving.contains(&route.id) {
                    serving.push(route.id);
                }
            }
        }
        let mut route_paths = HashMap::with_capacity(self.routes.len());
        for route in self.routes {
            let path = build_route_path(&route, &ways, &stops);
            route_paths.insert(route.id, path);
            let id = route.id;
            if routes.insert(id, route).is_some() {
                return Err(Error::InvalidData(format!("duplicate route id {id}")));
            }
        }

        let street = build_street_graph(&ways);
        let stop_index = RTree::bulk_load(
            stops
                .values()
                .map(|s| GeomWithData::new([s.geometry.x(), s.geometry.y()], s.id))
                .collect(),
        );

        info!(
            "Built transit network: {} stops, {} routes, {} ways, {} street nodes",
            stops.len(),
            routes.len(),
            ways.len(),
            street.node_count()
        );

        Ok(TransitNetwork {
            stops,
            routes,
            ways,
            routes_by_stop,
            stop_index,
            route_paths,
            street,
        })
    }
}

/// Build the directed street graph from way endpoints and directional costs.
/// A negative cost disables its direction (pgRouting convention).
fn build_street_graph(ways: &HashMap<WayId, Way>) -> StreetGraph {
    let mut graph: Graph<StreetNode, StreetEdge> = Graph::new();
    let mut node_lookup: HashMap<StreetNodeId, NodeIndex> = HashMap::new();

    let mut node_at = |graph: &mut Graph<StreetNode, StreetEdge>,
                       id: StreetNodeId,
                       location: Coord<f64>| {
        *node_lookup.entry(id).or_insert_with(|| {
            graph.add_node(StreetNode {
                id,
                geometry: Point::from(location),
            })
        })
    };

    for way in ways.values() {
        let first = way.geometry.0[0];
        let last = *way.geometry.0.last().expect("validated in build()");
        let source = node_at(&mut graph, way.source, first);
        let target = node_at(&mut graph, way.target, last);

        if (Haversine.distance(graph[source].geometry, Point::from(first))) > 1.0 {
            warn!(
                "way {}: source node {} already placed elsewhere, keeping first location",
                way.id, way.source
            );
        }

        if way.cost >= 0.0 {
            graph.add_edge(
                source,
                target,
                StreetEdge {
                    way_id: way.id,
                    cost: way.cost,
                    length_meters: way.length_meters,
                    geometry: way.geometry.clone(),
                },
            );
        }
        if way.reverse_cost >= 0.0 {
            let mut reversed = way.geometry.clone();
            reversed.0.reverse();
            graph.add_edge(
                target,
                source,
                StreetEdge {
                    way_id: way.id,
                    cost: way.reverse_cost,
                    length_meters: way.length_meters,
                    geometry: reversed,
                },
            );
        }
    }

    let node_index = RTree::bulk_load(
        graph
            .node_indices()
            .map(|idx| {
                let p = graph[idx].geometry;
                GeomWithData::new([p.x(), p.y()], idx)
            })
            .collect(),
    );

    StreetGraph {
        graph,
        node_index,
        node_lookup,
    }
}

/// Flatten a route's way sequence into one measured path and locate each
/// served stop's measure along it (nearest path vertex).
fn build_route_path(
    route: &Route,
    ways: &HashMap<WayId, Way>,
    stops: &HashMap<StopId, Stop>,
) -> RoutePath {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for way_id in &route.way_ids {
        let way = &ways[way_id];
        for &c in &way.geometry.0 {
            match coords.last() {
                Some(&prev) if (prev.x - c.x).abs() < 1e-12 && (prev.y - c.y).abs() < 1e-12 => {}
                _ => coords.push(c),
            }
        }
    }

    let mut cumulative = Vec::with_capacity(coords.len());
    let mut measure = 0.0;
    for (i, &c) in coords.iter().enumerate() {
        if i > 0 {
            measure += Haversine.distance(Point::from(coords[i - 1]), Point::from(c));
        }
        cumulative.push(measure);
    }

    let stop_measures = route
        .stops
        .iter()
        .map(|stop_id| {
            let stop_point = stops[stop_id].geometry;
            coords
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    let da = Haversine.distance(stop_point, Point::from(**a));
                    let db = Haversine.distance(stop_point, Point::from(**b));
                    da.total_cmp(&db)
                })
                .map_or(0.0, |(i, _)| cumulative[i])
        })
        .collect();

    RoutePath {
        coords,
        cumulative,
        stop_measures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_stop_ids() {
        let mut builder = NetworkBuilder::new();
        builder.add_stop(1, None, 40.0, -75.0);
        builder.add_stop(1, None, 40.1, -75.1);
        assert!(matches!(builder.build(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut builder = NetworkBuilder::new();
        builder.add_stop(1, None, 95.0, -75.0);
        assert!(matches!(builder.build(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn rejects_route_with_unknown_way() {
        let mut builder = NetworkBuilder::new();
        builder.add_route(7, "R7", "bus", false, vec![999], vec![]);
        assert!(matches!(builder.build(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn negative_reverse_cost_omits_reverse_edge() {
        let mut builder = NetworkBuilder::new();
        builder.add_way(
            1,
            None,
            Some("residential".to_string()),
            10,
            11,
            85.0,
            -1.0,
            vec![(-75.0, 40.0), (-74.999, 40.0)],
        );
        let network = builder.build().unwrap();
        assert_eq!(network.street.graph.node_count(), 2);
        assert_eq!(network.street.graph.edge_count(), 1);
    }

    #[test]
    fn route_path_measures_are_monotonic() {
        let mut builder = NetworkBuilder::new();
        builder.add_stop(1, None, 40.0, -75.0);
        builder.add_stop(2, None, 40.0, -74.998);
        builder.add_way(
            1,
            None,
            None,
            10,
            11,
            1.0,
            1.0,
            vec![(-75.0, 40.0), (-74.999, 40.0)],
        );
        builder.add_way(
            2,
            None,
            None,
            11,
            12,
            1.0,
            1.0,
            vec![(-74.999, 40.0), (-74.998, 40.0)],
        );
        builder.add_route(14, "R14", "bus", false, vec![1, 2], vec![1, 2]);
        let network = builder.build().unwrap();

        let path = network.route_path(14).unwrap();
        // Junction vertex deduplicated: 3 distinct vertices remain.
        assert_eq!(path.full_linestring().coords().count(), 3);
        let d = path.distance_between_stops(0, 1).unwrap();
        assert!((d - path.total_length()).abs() < 1e-6);
        assert!(d > 150.0 && d < 200.0, "two ~85 m ways, got {d}");
    }
}
