//! This module is responsible for turning line geometries into a routing
//! graph: flattening the feature collection, building raw edges and
//! closing small gaps between disconnected lines.

mod builder;
mod config;
mod indexer;
mod stitching;

pub use builder::{build_base_graph, build_graph, build_network_graph};
pub use config::{
    DEFAULT_STITCH_THRESHOLD_KM, GraphConfig, PolygonHandling, StitchingStrategy,
};
pub use indexer::{index_features, index_geometries};
pub use stitching::{chain_line_ends, stitch, stitch_pairwise};
