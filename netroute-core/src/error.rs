use thiserror::Error;

use crate::model::Coordinate;
use crate::source::SourceError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No path found between {from} and {to}")]
    NoPathFound { from: Coordinate, to: Coordinate },
    #[error("Invalid node index")]
    InvalidNodeIndex,
    #[error("Coordinate {0} is not a vertex of the routing graph")]
    UnknownVertex(Coordinate),
    #[error("Routing request contains no waypoints")]
    NoWaypoints,
    #[error("Upstream retrieval failed: {0}")]
    UpstreamRetrieval(#[source] SourceError),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
