//! Boundary to whatever supplies line geometry for a request area
//!
//! The engine does not care where the network comes from. It asks a
//! [`NetworkSource`] for the features inside the waypoints' bounding box
//! and treats any failure there as fatal to the request, never as an empty
//! network.

use std::future::Future;

use geo::{BoundingRect, Coord, MultiPoint, Rect};
use geojson::FeatureCollection;
use log::{debug, error};
use thiserror::Error;

use crate::{
    Error,
    model::Coordinate,
    router::{RouterConfig, route_network},
    routing::RouteResult,
};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to decode geometry: {0}")]
    Decode(String),
    #[error("Catalog error: {0}")]
    Catalog(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplier of line geometry restricted to an area and a set of feature classes
pub trait NetworkSource {
    fn fetch(
        &self,
        bbox: Rect<f64>,
        classes: &[String],
    ) -> impl Future<Output = Result<FeatureCollection, SourceError>> + Send;
}

/// Bounding box of the finite waypoints, grown by `margin_deg` on every side.
pub fn waypoint_bbox(waypoints: &[Coordinate], margin_deg: f64) -> Option<Rect<f64>> {
    let points: MultiPoint = waypoints
        .iter()
        .filter(|c| c.is_finite())
        .map(Coordinate::point)
        .collect();
    let rect = points.bounding_rect()?;
    let margin = margin_deg.max(0.0);

    Some(Rect::new(
        Coord {
            x: rect.min().x - margin,
            y: rect.min().y - margin,
        },
        Coord {
            x: rect.max().x + margin,
            y: rect.max().y + margin,
        },
    ))
}

/// Fetches the network covering `waypoints` from `source`.
pub async fn fetch_network<S: NetworkSource + Sync>(
    source: &S,
    waypoints: &[Coordinate],
    classes: &[String],
    margin_deg: f64,
) -> Result<FeatureCollection, Error> {
    let bbox = waypoint_bbox(waypoints, margin_deg).ok_or(Error::NoWaypoints)?;
    debug!("Fetching {classes:?} within {:?}", bbox);

    source.fetch(bbox, classes).await.map_err(|e| {
        error!("Network retrieval failed: {e}");
        Error::UpstreamRetrieval(e)
    })
}

/// Fetches the network for `waypoints` and routes over it.
pub async fn route_from_source<S: NetworkSource + Sync>(
    source: &S,
    waypoints: &[Coordinate],
    classes: &[String],
    margin_deg: f64,
    config: &RouterConfig,
) -> Result<RouteResult, Error> {
    if waypoints.is_empty() {
        return Err(Error::NoWaypoints);
    }
    let network = fetch_network(source, waypoints, classes, margin_deg).await?;
    route_network(&network, waypoints, config)
}
