//! Snapping onto edges rather than onto existing vertices

use geo::{Haversine, InterpolatableLine, Line, LineLocatePoint};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::model::{Coordinate, RoutingGraph};

/// How waypoints are attached to the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapMode {
    /// Nearest existing vertex
    #[default]
    Vertex,
    /// Nearest point on any edge, spliced into the graph as a new vertex
    Edge,
}

/// Projection of a point onto the closest edge of the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSnap {
    pub point: Coordinate,
    pub from: NodeIndex,
    pub to: NodeIndex,
    /// Position along the edge, 0 at `from` and 1 at `to`
    pub fraction: f64,
    pub distance_km: f64,
}

/// Closest point on any edge of the graph, or `None` if the graph has no edges.
pub fn snap_to_edge(point: Coordinate, graph: &RoutingGraph) -> Option<EdgeSnap> {
    let query = point.point();
    let mut nearest: Option<EdgeSnap> = None;

    for (from, to, _) in graph.edges() {
        let (Some(a), Some(b)) = (graph.coordinate(from), graph.coordinate(to)) else {
            continue;
        };
        let line = Line::new(a.0, b.0);

        // Locate the fraction along the segment, then place it on the great circle.
        let Some(fraction) = line.line_locate_point(&query) else {
            continue;
        };
        let fraction = fraction.clamp(0.0, 1.0);
        let projected = if fraction <= 0.0 {
            a
        } else if fraction >= 1.0 {
            b
        } else {
            Coordinate::from(line.point_at_ratio_from_start(&Haversine, fraction))
        };
        let distance_km = point.distance_km(&projected);

        if nearest.is_none_or(|best| distance_km < best.distance_km) {
            nearest = Some(EdgeSnap {
                point: projected,
                from,
                to,
                fraction,
                distance_km,
            });
        }
    }

    nearest
}

impl RoutingGraph {
    /// Inserts snapped points as vertices and returns their nodes in input order.
    ///
    /// Points on the same edge are chained in order along it, so the edge
    /// `from - to` gains the detour `from - p1 - p2 - ... - to`. The original
    /// edge stays in place.
    pub fn splice(&mut self, snaps: &[EdgeSnap]) -> Vec<NodeIndex> {
        let mut order: Vec<usize> = (0..snaps.len()).collect();
        order.sort_by(|&i, &j| {
            let (a, b) = (&snaps[i], &snaps[j]);
            (a.from, a.to)
                .cmp(&(b.from, b.to))
                .then(a.fraction.total_cmp(&b.fraction))
                .then(i.cmp(&j))
        });

        let mut nodes = vec![NodeIndex::end(); snaps.len()];
        let same_edge = |&i: &usize, &j: &usize| {
            (snaps[i].from, snaps[i].to) == (snaps[j].from, snaps[j].to)
        };
        for group in order.chunk_by(same_edge) {
            let edge = &snaps[group[0]];
            let mut previous = edge.from;
            for &slot in group {
                let node = self.add_vertex(snaps[slot].point);
                self.link(previous, node);
                nodes[slot] = node;
                previous = node;
            }
            self.link(previous, edge.to);
        }
        nodes
    }

    fn link(&mut self, a: NodeIndex, b: NodeIndex) {
        if let (Some(ca), Some(cb)) = (self.coordinate(a), self.coordinate(b)) {
            self.connect(a, b, ca.distance_km(&cb));
        }
    }
}
