//! Routes a whole waypoint sequence, one consecutive pair at a time

use std::borrow::Cow;

use itertools::Itertools;
use log::{debug, warn};
use petgraph::graph::NodeIndex;

use super::config::RouteConfig;
use super::densify::densify;
use super::dijkstra::shortest_path;
use super::result::{FailedPair, RouteResult, RouteSegment};
use crate::{
    Error,
    model::{Coordinate, RoutingGraph},
    spatial::{SnapMode, SpatialIndex, build_index, snap_to_edge},
};

/// Routes consecutive waypoint pairs over `graph`.
///
/// An empty waypoint list is the only request-level failure. Waypoints
/// that cannot be snapped are listed in [`RouteResult::unsnapped`], and
/// unreachable pairs are recorded in [`RouteResult::failed`] while the
/// remaining pairs are still routed.
pub fn route_waypoints(
    graph: &RoutingGraph,
    waypoints: &[Coordinate],
    config: &RouteConfig,
) -> Result<RouteResult, Error> {
    if waypoints.is_empty() {
        return Err(Error::NoWaypoints);
    }

    let points = match config.densify_spacing_m {
        Some(spacing_m) => {
            let points = densify(waypoints, spacing_m)?;
            debug!(
                "Densified {} waypoints into {} at {spacing_m} m spacing",
                waypoints.len(),
                points.len()
            );
            points
        }
        None => waypoints.to_vec(),
    };

    let mut result = RouteResult::default();
    let mut graph = Cow::Borrowed(graph);
    let snapped = match config.snap_mode {
        SnapMode::Vertex => {
            let index = build_index(&graph, config.neighbor_search);
            snap_to_vertices(&points, index.as_ref(), &mut result)
        }
        SnapMode::Edge => snap_to_edges(graph.to_mut(), &points, config, &mut result),
    };

    for (pair_index, (from, to)) in snapped.into_iter().tuple_windows().enumerate() {
        match shortest_path(&graph, from, to) {
            Ok(path) if path.is_trivial() => result.trivial_pairs += 1,
            Ok(path) => result.segments.push(RouteSegment {
                pair_index,
                coordinates: path.coordinates,
                distance_km: path.distance_km,
            }),
            Err(Error::NoPathFound { from, to }) => {
                warn!("No path between {from} and {to}, continuing with remaining waypoints");
                result.failed.push(FailedPair {
                    pair_index,
                    from,
                    to,
                });
            }
            Err(e) => return Err(e),
        }
    }

    debug!(
        "Routed {} segments, {} failed, {} trivial, {} unsnapped",
        result.segments.len(),
        result.failed.len(),
        result.trivial_pairs,
        result.unsnapped.len()
    );
    Ok(result)
}

fn snap_to_vertices(
    points: &[Coordinate],
    index: &dyn SpatialIndex,
    result: &mut RouteResult,
) -> Vec<NodeIndex> {
    points
        .iter()
        .filter_map(|&point| {
            let node = index.nearest(point);
            if node.is_none() {
                warn!("Waypoint {point} could not be snapped to an empty graph, dropping it");
                result.unsnapped.push(point);
            }
            node
        })
        .collect()
}

/// Projects each point onto its closest edge and splices it into the graph.
/// Falls back to the nearest vertex when the graph has no edges at all.
fn snap_to_edges(
    graph: &mut RoutingGraph,
    points: &[Coordinate],
    config: &RouteConfig,
    result: &mut RouteResult,
) -> Vec<NodeIndex> {
    // Project everything against the original edges before any splicing.
    let mut slots = Vec::with_capacity(points.len());
    let mut snaps = Vec::with_capacity(points.len());
    let mut unmatched = Vec::new();
    for (slot, &point) in points.iter().enumerate() {
        match snap_to_edge(point, graph) {
            Some(snap) => {
                slots.push(slot);
                snaps.push(snap);
            }
            None => unmatched.push((slot, point)),
        }
    }

    let mut snapped: Vec<(usize, NodeIndex)> =
        slots.into_iter().zip(graph.splice(&snaps)).collect();

    if !unmatched.is_empty() {
        let index = build_index(graph, config.neighbor_search);
        for (slot, point) in unmatched {
            match index.nearest(point) {
                Some(node) => snapped.push((slot, node)),
                None => {
                    warn!("Waypoint {point} could not be snapped to an empty graph, dropping it");
                    result.unsnapped.push(point);
                }
            }
        }
    }

    snapped.sort_by_key(|&(slot, _)| slot);
    snapped.into_iter().map(|(_, node)| node).collect()
}
