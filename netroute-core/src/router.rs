//! One-shot routing requests: geometry in, route out

use geojson::FeatureCollection;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    loading::{GraphConfig, build_network_graph},
    model::Coordinate,
    routing::{RouteConfig, RouteResult, route_waypoints},
};

/// Full configuration of a routing request
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub graph: GraphConfig,
    pub route: RouteConfig,
}

/// A waypoint sequence together with the network it should follow
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub network: FeatureCollection,
    pub waypoints: Vec<Coordinate>,
}

/// Builds a fresh graph from `network` and routes `waypoints` over it.
///
/// The graph lives only for the duration of the call.
pub fn route_network(
    network: &FeatureCollection,
    waypoints: &[Coordinate],
    config: &RouterConfig,
) -> Result<RouteResult, Error> {
    if waypoints.is_empty() {
        return Err(Error::NoWaypoints);
    }

    let graph = build_network_graph(network, &config.graph);
    route_waypoints(&graph, waypoints, &config.route)
}

/// Routes independent requests in parallel. Results keep the input order.
///
/// A failed request is logged at warn level with its position in the batch.
pub fn route_batch(
    requests: &[RouteRequest],
    config: &RouterConfig,
) -> Vec<Result<RouteResult, Error>> {
    info!("Routing batch of {} requests", requests.len());

    requests
        .par_iter()
        .enumerate()
        .map(|(index, request)| {
            let result = route_network(&request.network, &request.waypoints, config);
            if let Err(e) = &result {
                warn!("Batch request {index} failed: {e}");
            }
            result
        })
        .collect()
}
