use geojson::FeatureCollection;
use log::info;

use super::config::GraphConfig;
use super::indexer::index_geometries;
use super::stitching::stitch;
use crate::model::{Polyline, RoutingGraph};

/// Builds the routing graph for a feature collection
pub fn build_network_graph(collection: &FeatureCollection, config: &GraphConfig) -> RoutingGraph {
    let polylines = index_geometries(collection, config.polygons);
    build_graph(&polylines, config)
}

/// Builds the raw graph and applies the configured stitching strategy
pub fn build_graph(polylines: &[Polyline], config: &GraphConfig) -> RoutingGraph {
    let graph = build_base_graph(polylines);
    let graph = stitch(graph, polylines, config);

    info!(
        "Routing graph ready: {} vertices, {} edges from {} polylines",
        graph.vertex_count(),
        graph.edge_count(),
        polylines.len()
    );
    graph
}

/// One edge per consecutive coordinate pair, weighted by great-circle distance
pub fn build_base_graph(polylines: &[Polyline]) -> RoutingGraph {
    let coord_count: usize = polylines.iter().map(Polyline::len).sum();
    let mut graph = RoutingGraph::with_capacity(coord_count, coord_count);

    for polyline in polylines {
        for (a, b) in polyline.segments() {
            graph.add_segment(a, b);
        }
    }

    graph
}
