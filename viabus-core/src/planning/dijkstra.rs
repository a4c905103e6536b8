//! Traced shortest-path search over the street graph

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use ordered_float::OrderedFloat;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::deadline::{Deadline, POLL_INTERVAL};
use crate::error::Error;
use crate::model::network::StreetGraph;

/// Path cost key: total edge cost first, then hop count, so equal-cost
/// alternatives resolve to the path with fewer segments.
type CostKey = (OrderedFloat<f64>, u32);

#[derive(Copy, Clone, PartialEq, Eq)]
struct State {
    cost: OrderedFloat<f64>,
    hops: u32,
    node: NodeIndex,
}

// Min-heap by (cost, hops), reversed from the standard max BinaryHeap
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.hops.cmp(&self.hops))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra from `start` to `target`, returning the traversed edge sequence
/// or `None` when the graph is disconnected between them.
///
/// The deadline is polled every [`POLL_INTERVAL`] settled states; expiry
/// aborts the search with [`Error::DeadlineExceeded`].
pub(crate) fn shortest_edge_path(
    street: &StreetGraph,
    start: NodeIndex,
    target: NodeIndex,
    deadline: Deadline,
) -> Result<Option<Vec<EdgeIndex>>, Error> {
    if start == target {
        return Ok(Some(Vec::new()));
    }
    deadline.check("walking search")?;

    let graph = &street.graph;
    let estimated = graph.node_count().min(1024);
    let mut best: HashMap<NodeIndex, CostKey> = HashMap::with_capacity(estimated);
    let mut predecessors: HashMap<NodeIndex, (NodeIndex, EdgeIndex)> =
        HashMap::with_capacity(estimated);
    let mut heap = BinaryHeap::with_capacity(estimated / 4);

    best.insert(start, (OrderedFloat(0.0), 0));
    heap.push(State {
        cost: OrderedFloat(0.0),
        hops: 0,
        node: start,
    });

    let mut settled = 0usize;
    while let Some(State { cost, hops, node }) = heap.pop() {
        if node == target {
            break;
        }

        settled += 1;
        if settled % POLL_INTERVAL == 0 {
            deadline.check("walking search")?;
        }

        // Skip entries superseded by a better key
        if let Some(&key) = best.get(&node) {
            if (cost, hops) > key {
                continue;
            }
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_key = (OrderedFloat(cost.0 + edge.weight().cost), hops + 1);
            let improves = best.get(&next).is_none_or(|&key| next_key < key);
            if improves {
                best.insert(next, next_key);
                predecessors.insert(next, (node, edge.id()));
                heap.push(State {
                    cost: next_key.0,
                    hops: next_key.1,
                    node: next,
                });
            }
        }
    }

    if !best.contains_key(&target) {
        return Ok(None);
    }

    // Follow predecessors backward from target to start
    let mut edges = Vec::new();
    let mut current = target;
    while current != start {
        let Some(&(prev, edge)) = predecessors.get(&current) else {
            return Ok(None);
        };
        edges.push(edge);
        current = prev;
    }
    edges.reverse();
    Ok(Some(edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::NetworkBuilder;

    /// Diamond: 10→11→13 costs 10+10, 10→12→14→13 costs 8+6+6. Plus an
    /// isolated pair 20→21.
    fn fixture() -> crate::model::TransitNetwork {
        let mut builder = NetworkBuilder::new();
        builder.add_way(1, None, None, 10, 11, 10.0, 10.0, vec![(-75.0, 40.0), (-74.999, 40.001)]);
        builder.add_way(2, None, None, 11, 13, 10.0, 10.0, vec![(-74.999, 40.001), (-74.998, 40.0)]);
        builder.add_way(3, None, None, 10, 12, 8.0, 8.0, vec![(-75.0, 40.0), (-74.9995, 39.999)]);
        builder.add_way(4, None, None, 12, 14, 6.0, 6.0, vec![(-74.9995, 39.999), (-74.999, 39.999)]);
        builder.add_way(5, None, None, 14, 13, 6.0, 6.0, vec![(-74.999, 39.999), (-74.998, 40.0)]);
        builder.add_way(6, None, None, 20, 21, 1.0, 1.0, vec![(-70.0, 42.0), (-69.999, 42.0)]);
        builder.build().unwrap()
    }

    #[test]
    fn picks_cheapest_path() {
        let network = fixture();
        let street = &network.street;
        let start = street.node_by_id(10).unwrap();
        let target = street.node_by_id(13).unwrap();
        let path = shortest_edge_path(street, start, target, Deadline::none())
            .unwrap()
            .unwrap();
        // 8+6+6 = 20 on three edges beats 10+10 = 20... equal cost: fewer
        // hops wins, so the two-edge path is chosen.
        assert_eq!(path.len(), 2);
        let total: f64 = path.iter().map(|&e| street.graph[e].cost).sum();
        assert!((total - 20.0).abs() < 1e-9);
    }

    #[test]
    fn disconnected_target_is_none() {
        let network = fixture();
        let street = &network.street;
        let start = street.node_by_id(10).unwrap();
        let target = street.node_by_id(20).unwrap();
        assert!(shortest_edge_path(street, start, target, Deadline::none())
            .unwrap()
            .is_none());
    }

    #[test]
    fn same_node_is_empty_path() {
        let network = fixture();
        let street = &network.street;
        let node = street.node_by_id(10).unwrap();
        let path = shortest_edge_path(street, node, node, Deadline::none())
            .unwrap()
            .unwrap();
        assert!(path.is_empty());
    }
}
