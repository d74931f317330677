//! Closing topological gaps between lines that should touch but don't

use log::{debug, info};
use petgraph::graph::NodeIndex;

use super::config::{GraphConfig, StitchingStrategy};
use crate::model::{Coordinate, Polyline, RoutingGraph};
use crate::spatial::{NeighborSearch, build_index};

/// Applies the configured stitching strategy, consuming the base graph
pub fn stitch(mut graph: RoutingGraph, polylines: &[Polyline], config: &GraphConfig) -> RoutingGraph {
    let added = match config.stitching {
        StitchingStrategy::None => 0,
        StitchingStrategy::PairwiseThreshold { threshold_km } => {
            stitch_pairwise(&mut graph, threshold_km, config.neighbor_search)
        }
        StitchingStrategy::LineEndChaining { max_gap_km } => {
            chain_line_ends(&mut graph, polylines, max_gap_km)
        }
    };

    if added > 0 {
        info!("Stitching added {added} edges ({:?})", config.stitching);
    }
    graph
}

/// Connects every pair of non-adjacent vertices within `threshold_km`.
///
/// With [`NeighborSearch::BruteForce`] this is a quadratic scan over the
/// vertex set. It is meant for bounded-area graphs; past a few thousand
/// vertices use [`NeighborSearch::RTree`].
pub fn stitch_pairwise(graph: &mut RoutingGraph, threshold_km: f64, search: NeighborSearch) -> usize {
    if threshold_km.is_nan() || threshold_km < 0.0 {
        return 0;
    }

    let pairs: Vec<(NodeIndex, NodeIndex, f64)> = {
        let index = build_index(graph, search);
        graph
            .vertices()
            .flat_map(|(node, coord)| {
                index
                    .within(coord, threshold_km)
                    .into_iter()
                    .filter(move |&other| other > node)
                    .map(move |other| (node, other, coord))
            })
            .filter(|&(node, other, _)| !graph.is_adjacent(node, other))
            .filter_map(|(node, other, coord)| {
                let other_coord = graph.coordinate(other)?;
                Some((node, other, coord.distance_km(&other_coord)))
            })
            .collect()
    };

    let added = pairs
        .into_iter()
        .filter(|&(a, b, dist)| graph.connect(a, b, dist))
        .count();

    debug!("Pairwise stitching within {threshold_km} km added {added} edges");
    added
}

/// Joins line ends to line starts when both agree they are each other's
/// closest counterpart and the gap is at most `max_gap_km`.
pub fn chain_line_ends(graph: &mut RoutingGraph, polylines: &[Polyline], max_gap_km: f64) -> usize {
    let starts: Vec<Coordinate> = polylines.iter().map(Polyline::first).collect();
    let ends: Vec<Coordinate> = polylines.iter().map(Polyline::last).collect();

    let mut added = 0;
    for (i, end) in ends.iter().enumerate() {
        let Some((j, gap)) = closest(end, &starts, i) else {
            continue;
        };
        if gap > max_gap_km {
            continue;
        }
        // The start must agree that this end is its closest line end.
        if closest(&starts[j], &ends, j).map(|(k, _)| k) != Some(i) {
            continue;
        }

        let (Some(from), Some(to)) = (graph.node_of(end), graph.node_of(&starts[j])) else {
            continue;
        };
        if graph.connect(from, to, gap) {
            added += 1;
        }
    }

    debug!("Line-end chaining within {max_gap_km} km added {added} edges");
    added
}

/// Index and distance of the closest candidate, skipping `exclude`. Ties go to the lower index.
fn closest(point: &Coordinate, candidates: &[Coordinate], exclude: usize) -> Option<(usize, f64)> {
    candidates
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != exclude)
        .map(|(idx, candidate)| (idx, point.distance_km(candidate)))
        .fold(None, |best, (idx, dist)| match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((idx, dist)),
        })
}
