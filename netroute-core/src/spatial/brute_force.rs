use petgraph::graph::NodeIndex;

use super::SpatialIndex;
use crate::model::{Coordinate, RoutingGraph};

/// Linear scan over every vertex of a graph.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceIndex<'a> {
    graph: &'a RoutingGraph,
}

impl<'a> BruteForceIndex<'a> {
    pub fn new(graph: &'a RoutingGraph) -> Self {
        Self { graph }
    }
}

impl SpatialIndex for BruteForceIndex<'_> {
    fn nearest(&self, point: Coordinate) -> Option<NodeIndex> {
        let mut closest = None;
        let mut min_dist = f64::INFINITY;

        for (node, coord) in self.graph.vertices() {
            let dist = point.distance_km(&coord);
            if dist < min_dist || closest.is_none() {
                min_dist = dist;
                closest = Some(node);
            }
        }

        closest
    }

    fn within(&self, point: Coordinate, radius_km: f64) -> Vec<NodeIndex> {
        self.graph
            .vertices()
            .filter(|(_, coord)| point.distance_km(coord) <= radius_km)
            .map(|(node, _)| node)
            .collect()
    }
}
