//! Shortest paths over the routing graph and assembly of multi-waypoint routes

pub mod assembler;
mod config;
pub mod densify;
pub mod dijkstra;
pub mod result;

pub use assembler::route_waypoints;
pub use config::{DEFAULT_DENSIFY_SPACING_M, RouteConfig};
pub use densify::{MAX_DENSIFIED_POINTS, MIN_DENSIFY_SPACING_M, densify};
pub use dijkstra::{PathResult, resolve, shortest_path};
pub use result::{FailedPair, RouteResult, RouteSegment};
