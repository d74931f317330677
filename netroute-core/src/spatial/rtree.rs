use petgraph::graph::NodeIndex;
use rstar::{RTree, primitives::GeomWithData};

use super::{SpatialIndex, search_envelope};
use crate::model::{Coordinate, RoutingGraph};

pub(crate) type IndexedVertex = GeomWithData<[f64; 2], NodeIndex>;

/// R-tree over vertex positions.
///
/// The tree itself is planar in lon/lat degrees. Queries use it only to
/// narrow the candidate set and rank candidates by haversine distance.
pub struct RTreeIndex {
    tree: RTree<IndexedVertex>,
}

impl RTreeIndex {
    pub fn new(graph: &RoutingGraph) -> Self {
        let vertices = graph
            .vertices()
            .map(|(node, coord)| IndexedVertex::new([coord.lon(), coord.lat()], node))
            .collect();

        Self {
            tree: RTree::bulk_load(vertices),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    fn candidates(&self, point: Coordinate, radius_km: f64) -> Vec<(NodeIndex, f64)> {
        let mut found: Vec<_> = self
            .tree
            .locate_in_envelope(&search_envelope(point, radius_km))
            .filter_map(|entry| {
                let [lon, lat] = *entry.geom();
                let dist = point.distance_km(&Coordinate::new(lon, lat));
                (dist <= radius_km).then_some((entry.data, dist))
            })
            .collect();
        found.sort_unstable_by_key(|(node, _)| *node);
        found
    }
}

impl SpatialIndex for RTreeIndex {
    fn nearest(&self, point: Coordinate) -> Option<NodeIndex> {
        let seed = self.tree.nearest_neighbor(&[point.lon(), point.lat()])?;
        let [lon, lat] = *seed.geom();
        let bound = point.distance_km(&Coordinate::new(lon, lat));

        // The planar nearest neighbour bounds the haversine one from above.
        let mut closest = seed.data;
        let mut min_dist = bound;
        for (node, dist) in self.candidates(point, bound) {
            if dist < min_dist || (dist == min_dist && node < closest) {
                min_dist = dist;
                closest = node;
            }
        }
        Some(closest)
    }

    fn within(&self, point: Coordinate, radius_km: f64) -> Vec<NodeIndex> {
        self.candidates(point, radius_km)
            .into_iter()
            .map(|(node, _)| node)
            .collect()
    }
}
