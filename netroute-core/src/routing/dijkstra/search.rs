use std::collections::BinaryHeap;

use hashbrown::HashMap;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::state::State;
use crate::{Error, model::Coordinate, model::RoutingGraph};

/// Shortest path between two vertices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub coordinates: Vec<Coordinate>,
    #[serde(skip)]
    pub nodes: Vec<NodeIndex>,
    pub distance_km: f64,
}

impl PathResult {
    /// A path that never leaves its start vertex
    pub fn is_trivial(&self) -> bool {
        self.coordinates.len() <= 1
    }
}

/// Dijkstra's algorithm between two vertices, stopping once the target is settled.
///
/// A query from a vertex to itself succeeds with a single-coordinate path.
/// When the target cannot be reached the call fails with
/// [`Error::NoPathFound`].
pub fn shortest_path(
    graph: &RoutingGraph,
    start: NodeIndex,
    target: NodeIndex,
) -> Result<PathResult, Error> {
    let from = graph.coordinate(start).ok_or(Error::InvalidNodeIndex)?;
    let to = graph.coordinate(target).ok_or(Error::InvalidNodeIndex)?;

    if start == target {
        return Ok(PathResult {
            coordinates: vec![from],
            nodes: vec![start],
            distance_km: 0.0,
        });
    }

    let estimated_nodes = graph.vertex_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    // Start node has distance 0
    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    let mut reached = false;
    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            reached = true;
            break;
        }

        // Skip if we've found a better path
        if distances.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        for (next, weight) in graph.neighbors(node) {
            let next_cost = cost + weight;

            // Add or update distance if better using Entry API
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, node);
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, node);
                    }
                }
            }
        }
    }

    if !reached {
        return Err(Error::NoPathFound { from, to });
    }

    // Follow predecessors backward from target to start
    let mut nodes = vec![target];
    let mut current = target;
    while current != start {
        current = *predecessors.get(&current).ok_or(Error::NoPathFound { from, to })?;
        nodes.push(current);
    }
    nodes.reverse();

    let coordinates = nodes
        .iter()
        .map(|&node| graph.coordinate(node).ok_or(Error::InvalidNodeIndex))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PathResult {
        coordinates,
        nodes,
        distance_km: distances[&target],
    })
}

/// Shortest path between two coordinates that are already graph vertices.
pub fn resolve(
    graph: &RoutingGraph,
    start: Coordinate,
    end: Coordinate,
) -> Result<Vec<Coordinate>, Error> {
    let from = graph.node_of(&start).ok_or(Error::UnknownVertex(start))?;
    let to = graph.node_of(&end).ok_or(Error::UnknownVertex(end))?;
    shortest_path(graph, from, to).map(|path| path.coordinates)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Square with a long way round (a-b-c) and a short diagonal (a-d-c).
    fn diamond() -> (RoutingGraph, [Coordinate; 5]) {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 0.02);
        let c = Coordinate::new(0.01, 0.02);
        let d = Coordinate::new(0.004, 0.009);
        let island = Coordinate::new(1.0, 1.0);

        let mut graph = RoutingGraph::new();
        graph.add_segment(a, b);
        graph.add_segment(b, c);
        graph.add_segment(a, d);
        graph.add_segment(d, c);
        graph.add_vertex(island);
        (graph, [a, b, c, d, island])
    }

    #[test]
    fn finds_the_shorter_branch() {
        let (graph, [a, _, c, d, _]) = diamond();
        let path = resolve(&graph, a, c).unwrap();
        assert_eq!(path, vec![a, d, c]);
    }

    #[test]
    fn distance_is_the_sum_of_edge_weights() {
        let (graph, [a, _, c, d, _]) = diamond();
        let path = shortest_path(
            &graph,
            graph.node_of(&a).unwrap(),
            graph.node_of(&c).unwrap(),
        )
        .unwrap();
        assert_relative_eq!(path.distance_km, a.distance_km(&d) + d.distance_km(&c));
        assert_eq!(path.nodes.len(), 3);
    }

    #[test]
    fn path_is_reversible() {
        let (graph, [a, _, c, d, _]) = diamond();
        assert_eq!(resolve(&graph, c, a).unwrap(), vec![c, d, a]);
    }

    #[test]
    fn same_vertex_is_a_trivial_success() {
        let (graph, [a, ..]) = diamond();
        let node = graph.node_of(&a).unwrap();
        let path = shortest_path(&graph, node, node).unwrap();
        assert_eq!(path.coordinates, vec![a]);
        assert_eq!(path.distance_km, 0.0);
        assert!(path.is_trivial());
    }

    #[test]
    fn unreachable_target_fails_with_no_path_found() {
        let (graph, [a, _, _, _, island]) = diamond();
        let err = resolve(&graph, a, island).unwrap_err();
        assert!(matches!(err, Error::NoPathFound { from, to } if from == a && to == island));
    }

    #[test]
    fn coordinates_off_the_graph_are_rejected() {
        let (graph, [a, ..]) = diamond();
        let stray = Coordinate::new(0.5, 0.5);
        assert!(matches!(
            resolve(&graph, a, stray),
            Err(Error::UnknownVertex(c)) if c == stray
        ));
    }
}
