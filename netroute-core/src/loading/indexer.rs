use geo::{Geometry, LineString, Polygon};
use geojson::{Feature, FeatureCollection};
use log::{debug, trace};

use super::config::PolygonHandling;
use crate::model::Polyline;

/// Flattens a feature collection into polylines.
///
/// Lines and multi-lines contribute their parts directly. Polygons only
/// contribute with [`PolygonHandling::Boundary`]. Parts with fewer than two
/// usable coordinates are skipped.
pub fn index_geometries(collection: &FeatureCollection, polygons: PolygonHandling) -> Vec<Polyline> {
    index_features(&collection.features, polygons)
}

pub fn index_features<'a>(
    features: impl IntoIterator<Item = &'a Feature>,
    polygons: PolygonHandling,
) -> Vec<Polyline> {
    let mut indexer = Indexer {
        polygons,
        polylines: Vec::new(),
        skipped: 0,
    };

    for (idx, feature) in features.into_iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            trace!("Feature {idx} has no geometry");
            continue;
        };
        match Geometry::<f64>::try_from(geometry.clone()) {
            Ok(geometry) => indexer.visit(geometry),
            Err(e) => debug!("Skipping feature {idx} with unreadable geometry: {e}"),
        }
    }

    debug!(
        "Indexed {} polylines ({} degenerate parts skipped)",
        indexer.polylines.len(),
        indexer.skipped
    );
    indexer.polylines
}

struct Indexer {
    polygons: PolygonHandling,
    polylines: Vec<Polyline>,
    skipped: usize,
}

impl Indexer {
    fn visit(&mut self, geometry: Geometry<f64>) {
        match geometry {
            Geometry::LineString(line) => self.push(&line),
            Geometry::MultiLineString(lines) => {
                for line in &lines {
                    self.push(line);
                }
            }
            Geometry::Line(line) => self.push(&LineString::from(line)),
            Geometry::Polygon(polygon) => self.visit_polygon(&polygon),
            Geometry::MultiPolygon(polygons) => {
                for polygon in &polygons {
                    self.visit_polygon(polygon);
                }
            }
            Geometry::GeometryCollection(collection) => {
                for geometry in collection {
                    self.visit(geometry);
                }
            }
            _ => {}
        }
    }

    fn visit_polygon(&mut self, polygon: &Polygon<f64>) {
        if self.polygons == PolygonHandling::Exclude {
            return;
        }
        self.push(polygon.exterior());
        for ring in polygon.interiors() {
            self.push(ring);
        }
    }

    fn push(&mut self, line: &LineString<f64>) {
        match Polyline::try_from(line) {
            Ok(polyline) => self.polylines.push(polyline),
            Err(()) => self.skipped += 1,
        }
    }
}
