use geo::LineString;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde::Serialize;
use serde_json::json;

use crate::{Error, model::Coordinate};

/// Path between two consecutive snapped waypoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    /// Index of the waypoint pair this segment connects
    pub pair_index: usize,
    pub coordinates: Vec<Coordinate>,
    pub distance_km: f64,
}

/// Snapped endpoints of a waypoint pair that could not be connected
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FailedPair {
    pub pair_index: usize,
    pub from: Coordinate,
    pub to: Coordinate,
}

/// Outcome of routing a waypoint sequence.
///
/// Failed pairs are reported next to the segments that did route; a
/// partially routable request is still a successful request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteResult {
    pub segments: Vec<RouteSegment>,
    pub failed: Vec<FailedPair>,
    /// Waypoints that could not be snapped because the graph was empty
    pub unsnapped: Vec<Coordinate>,
    /// Pairs whose endpoints snapped to the same vertex
    pub trivial_pairs: usize,
}

impl RouteResult {
    pub fn total_distance_km(&self) -> f64 {
        self.segments.iter().map(|s| s.distance_km).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.unsnapped.is_empty()
    }

    /// Converts segments and failed pairs to a `GeoJSON` `FeatureCollection`.
    ///
    /// Every feature carries a `status` property: `routed` for segments,
    /// `failed` for straight lines between unconnected endpoints and
    /// `unsnapped` for waypoints that never reached the graph.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = Vec::with_capacity(self.segments.len() + self.failed.len());

        for segment in &self.segments {
            features.push(line_feature(
                &segment.coordinates,
                json!({
                    "status": "routed",
                    "pair_index": segment.pair_index,
                    "distance_km": segment.distance_km,
                }),
            )?);
        }

        for pair in &self.failed {
            features.push(line_feature(
                &[pair.from, pair.to],
                json!({
                    "status": "failed",
                    "pair_index": pair.pair_index,
                }),
            )?);
        }

        for waypoint in &self.unsnapped {
            let geometry = Geometry::new(GeoJsonValue::from(&waypoint.point()));
            features.push(feature(geometry, json!({ "status": "unsnapped" }))?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn line_feature(coords: &[Coordinate], properties: serde_json::Value) -> Result<Feature, Error> {
    let line: LineString<f64> = coords.iter().map(|c| c.0).collect();
    feature(Geometry::new(GeoJsonValue::from(&line)), properties)
}

fn feature(geometry: Geometry, properties: serde_json::Value) -> Result<Feature, Error> {
    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
