//! Routing along line networks such as waterways.
//!
//! Line geometries are flattened into polylines, turned into an undirected
//! graph weighted by great-circle kilometers, optionally stitched where
//! line ends nearly meet, and then searched with Dijkstra between snapped
//! waypoints.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod router;
pub mod routing;
pub mod source;
pub mod spatial;

pub use error::Error;
pub use loading::{GraphConfig, StitchingStrategy, build_graph, build_network_graph};
pub use model::{Coordinate, Polyline, RoutingGraph};
pub use router::{RouteRequest, RouterConfig, route_batch, route_network};
pub use routing::{RouteConfig, RouteResult, route_waypoints};
pub use spatial::locate;
