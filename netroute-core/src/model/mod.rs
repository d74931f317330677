//! Data model for line-network routing
//!
//! Contains coordinates, polylines and the routing graph built from them.

pub mod coordinate;
pub mod graph;
pub mod polyline;

pub use coordinate::{Coordinate, VertexKey};
pub use graph::{NetworkGraph, RoutingGraph};
pub use polyline::Polyline;
