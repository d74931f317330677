// Re-export key components
pub use crate::loading::{
    GraphConfig, PolygonHandling, StitchingStrategy, build_base_graph, build_graph,
    build_network_graph, index_geometries, stitch,
};
pub use crate::model::{Coordinate, Polyline, RoutingGraph};
pub use crate::router::{RouteRequest, RouterConfig, route_batch, route_network};
pub use crate::routing::{
    FailedPair, PathResult, RouteConfig, RouteResult, RouteSegment, densify, resolve,
    route_waypoints, shortest_path,
};
pub use crate::source::{NetworkSource, SourceError, fetch_network, route_from_source};
pub use crate::spatial::{NeighborSearch, SnapMode, locate};

pub use crate::Error;
