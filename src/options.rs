//! Keyword options and conversions shared by the Python entry points

use geojson::{FeatureCollection, GeoJson};
use netroute_core::prelude::*;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

pub(crate) fn parse_network(network: &str) -> PyResult<FeatureCollection> {
    let geojson = network
        .parse::<GeoJson>()
        .map_err(|e| PyValueError::new_err(format!("Invalid GeoJSON: {e}")))?;
    FeatureCollection::try_from(geojson)
        .map_err(|e| PyValueError::new_err(format!("Expected a FeatureCollection: {e}")))
}

pub(crate) fn to_coordinates(points: &[(f64, f64)]) -> Vec<Coordinate> {
    points.iter().map(|&point| Coordinate::from(point)).collect()
}

pub(crate) fn to_py_err(e: Error) -> PyErr {
    match e {
        Error::NoWaypoints
        | Error::UnknownVertex(_)
        | Error::InvalidData(_)
        | Error::GeoJsonError(_) => PyValueError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

pub(crate) fn stitching_strategy(name: &str, threshold_km: f64) -> PyResult<StitchingStrategy> {
    match name {
        "none" => Ok(StitchingStrategy::None),
        "pairwise_threshold" => Ok(StitchingStrategy::PairwiseThreshold { threshold_km }),
        "line_end_chaining" => Ok(StitchingStrategy::LineEndChaining {
            max_gap_km: threshold_km,
        }),
        other => Err(PyValueError::new_err(format!(
            "Unknown stitching strategy '{other}', expected none, pairwise_threshold or line_end_chaining"
        ))),
    }
}

pub(crate) fn neighbor_search(name: &str) -> PyResult<NeighborSearch> {
    match name {
        "brute_force" => Ok(NeighborSearch::BruteForce),
        "rtree" => Ok(NeighborSearch::RTree),
        other => Err(PyValueError::new_err(format!(
            "Unknown neighbor search '{other}', expected brute_force or rtree"
        ))),
    }
}

pub(crate) fn polygon_handling(name: &str) -> PyResult<PolygonHandling> {
    match name {
        "exclude" => Ok(PolygonHandling::Exclude),
        "boundary" => Ok(PolygonHandling::Boundary),
        other => Err(PyValueError::new_err(format!(
            "Unknown polygon handling '{other}', expected exclude or boundary"
        ))),
    }
}

pub(crate) fn snap_mode(name: &str) -> PyResult<SnapMode> {
    match name {
        "vertex" => Ok(SnapMode::Vertex),
        "edge" => Ok(SnapMode::Edge),
        other => Err(PyValueError::new_err(format!(
            "Unknown snap mode '{other}', expected vertex or edge"
        ))),
    }
}

pub(crate) fn graph_config(
    stitching: &str,
    threshold_km: f64,
    search: &str,
    polygons: &str,
) -> PyResult<GraphConfig> {
    Ok(GraphConfig {
        stitching: stitching_strategy(stitching, threshold_km)?,
        neighbor_search: neighbor_search(search)?,
        polygons: polygon_handling(polygons)?,
    })
}

pub(crate) fn route_config(
    densify_spacing_m: Option<f64>,
    snap: &str,
    search: &str,
) -> PyResult<RouteConfig> {
    Ok(RouteConfig {
        densify_spacing_m,
        snap_mode: snap_mode(snap)?,
        neighbor_search: neighbor_search(search)?,
    })
}

fn coords(coordinates: &[Coordinate]) -> Vec<(f64, f64)> {
    coordinates.iter().map(|c| (c.lon(), c.lat())).collect()
}

/// Converts a route result into a plain Python dictionary
pub(crate) fn result_to_py(py: Python<'_>, result: &RouteResult) -> PyResult<Py<PyAny>> {
    let segments = PyList::empty(py);
    for segment in &result.segments {
        let entry = PyDict::new(py);
        entry.set_item("pair_index", segment.pair_index)?;
        entry.set_item("coordinates", coords(&segment.coordinates))?;
        entry.set_item("distance_km", segment.distance_km)?;
        segments.append(entry)?;
    }

    let failed = PyList::empty(py);
    for pair in &result.failed {
        let entry = PyDict::new(py);
        entry.set_item("pair_index", pair.pair_index)?;
        entry.set_item("from", (pair.from.lon(), pair.from.lat()))?;
        entry.set_item("to", (pair.to.lon(), pair.to.lat()))?;
        failed.append(entry)?;
    }

    let dict = PyDict::new(py);
    dict.set_item("segments", segments)?;
    dict.set_item("failed", failed)?;
    dict.set_item("unsnapped", coords(&result.unsnapped))?;
    dict.set_item("trivial_pairs", result.trivial_pairs)?;
    dict.set_item("total_distance_km", result.total_distance_km())?;
    dict.set_item("complete", result.is_complete())?;
    dict.set_item("geojson", result.to_geojson_string().map_err(to_py_err)?)?;

    Ok(dict.into_any().unbind())
}
