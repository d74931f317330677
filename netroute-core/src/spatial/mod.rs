//! Nearest-vertex lookups over the routing graph
//!
//! Snapping and stitching only ever ask two questions of the vertex set:
//! "which vertex is closest to this point" and "which vertices lie within
//! this radius". Both are answered through [`SpatialIndex`], with a linear
//! scan as the default and an R-tree for larger graphs. Every answer is in
//! exact great-circle kilometers, so the two implementations agree.

mod brute_force;
mod rtree;
pub mod snap;

use petgraph::graph::NodeIndex;
use rstar::AABB;
use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, RoutingGraph};

pub use brute_force::BruteForceIndex;
pub use rtree::RTreeIndex;
pub use snap::{EdgeSnap, SnapMode, snap_to_edge};

/// Mean earth radius used by the haversine formula, in kilometers
const EARTH_RADIUS_KM: f64 = 6_371.008_8;

pub trait SpatialIndex {
    /// Closest vertex to `point`. Ties go to the vertex inserted first.
    fn nearest(&self, point: Coordinate) -> Option<NodeIndex>;

    /// Vertices no further than `radius_km` from `point`, ordered by node index.
    fn within(&self, point: Coordinate, radius_km: f64) -> Vec<NodeIndex>;
}

/// Which [`SpatialIndex`] implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSearch {
    /// Linear scan over every vertex. Stitching with it is O(V²), which is
    /// fine for bounded-area requests but should not be used past a few
    /// thousand vertices.
    #[default]
    BruteForce,
    #[serde(rename = "rtree")]
    RTree,
}

pub fn build_index<'a>(
    graph: &'a RoutingGraph,
    search: NeighborSearch,
) -> Box<dyn SpatialIndex + 'a> {
    match search {
        NeighborSearch::BruteForce => Box::new(BruteForceIndex::new(graph)),
        NeighborSearch::RTree => Box::new(RTreeIndex::new(graph)),
    }
}

/// Nearest graph vertex to `point`, or `None` for an empty graph.
pub fn locate(point: Coordinate, graph: &RoutingGraph) -> Option<Coordinate> {
    locate_with(point, graph, &BruteForceIndex::new(graph))
}

pub fn locate_with(
    point: Coordinate,
    graph: &RoutingGraph,
    index: &dyn SpatialIndex,
) -> Option<Coordinate> {
    index
        .nearest(point)
        .and_then(|node| graph.coordinate(node))
}

/// Lon/lat box guaranteed to contain every point within `radius_km` of `center`.
pub(crate) fn search_envelope(center: Coordinate, radius_km: f64) -> AABB<[f64; 2]> {
    let angular = (radius_km / EARTH_RADIUS_KM).max(0.0);
    // Small slack so rounding in the trigonometry never trims a boundary point
    let slack = |deg: f64| deg * (1.0 + 1e-9) + 1e-12;

    let dlat = slack(angular.to_degrees());
    let cos_lat = center.lat().to_radians().cos();
    let dlon = if angular >= std::f64::consts::FRAC_PI_2 || angular.sin() >= cos_lat {
        360.0
    } else {
        slack((angular.sin() / cos_lat).asin().to_degrees())
    };

    AABB::from_corners(
        [center.lon() - dlon, center.lat() - dlat],
        [center.lon() + dlon, center.lat() + dlat],
    )
}
