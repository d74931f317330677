use netroute_core::prelude::*;
use pyo3::prelude::*;

use crate::options::{
    graph_config, parse_network, result_to_py, route_config, to_coordinates, to_py_err,
};

/// Route waypoints along a line network in one call
///
/// Builds a throwaway graph from ``network`` (a GeoJSON FeatureCollection
/// string) and routes each consecutive pair of ``waypoints``.
///
/// Parameters
/// ----------
/// network : str
///     GeoJSON FeatureCollection of LineString / MultiLineString features
/// waypoints : list[tuple[float, float]]
///     ``(lon, lat)`` positions in visiting order
/// stitching : str, default="pairwise_threshold"
///     ``none``, ``pairwise_threshold`` or ``line_end_chaining``
/// threshold_km : float, default=0.1
///     Largest gap the stitching strategy may close
/// densify_spacing_m : float, optional
///     Insert intermediate waypoints at this spacing before snapping
/// snap_mode : str, default="vertex"
///     ``vertex`` snaps to the nearest vertex, ``edge`` to the nearest edge
///
/// Returns
/// -------
/// dict
///     ``segments``, ``failed``, ``unsnapped``, ``trivial_pairs``,
///     ``total_distance_km``, ``complete`` and a ``geojson`` string
///
/// Raises
/// ------
/// ValueError
///     If the network is not valid GeoJSON or ``waypoints`` is empty
///
/// Notes
/// -----
/// The GIL is released while the graph is built and searched.
#[pyfunction]
#[pyo3(signature = (network, waypoints, stitching="pairwise_threshold", threshold_km=0.1, polygons="exclude", neighbor_search="brute_force", densify_spacing_m=None, snap_mode="vertex"))]
#[allow(clippy::too_many_arguments)]
pub fn route(
    py: Python<'_>,
    network: &str,
    waypoints: Vec<(f64, f64)>,
    stitching: &str,
    threshold_km: f64,
    polygons: &str,
    neighbor_search: &str,
    densify_spacing_m: Option<f64>,
    snap_mode: &str,
) -> PyResult<Py<PyAny>> {
    let collection = parse_network(network)?;
    let config = RouterConfig {
        graph: graph_config(stitching, threshold_km, neighbor_search, polygons)?,
        route: route_config(densify_spacing_m, snap_mode, neighbor_search)?,
    };
    let waypoints = to_coordinates(&waypoints);

    let result = py
        .detach(|| route_network(&collection, &waypoints, &config))
        .map_err(to_py_err)?;
    result_to_py(py, &result)
}

/// Route many independent ``(network, waypoints)`` requests in parallel
///
/// Accepts the same options as :func:`route`, applied to every request.
/// Results keep the order of ``requests``. A request that fails (for
/// example with no waypoints) yields None in its slot, and the reason is
/// logged as a warning through the ``logging`` module.
#[pyfunction]
#[pyo3(signature = (requests, stitching="pairwise_threshold", threshold_km=0.1, polygons="exclude", neighbor_search="brute_force", densify_spacing_m=None, snap_mode="vertex"))]
#[allow(clippy::too_many_arguments)]
pub fn route_many(
    py: Python<'_>,
    requests: Vec<(String, Vec<(f64, f64)>)>,
    stitching: &str,
    threshold_km: f64,
    polygons: &str,
    neighbor_search: &str,
    densify_spacing_m: Option<f64>,
    snap_mode: &str,
) -> PyResult<Vec<Option<Py<PyAny>>>> {
    let config = RouterConfig {
        graph: graph_config(stitching, threshold_km, neighbor_search, polygons)?,
        route: route_config(densify_spacing_m, snap_mode, neighbor_search)?,
    };
    let requests = requests
        .iter()
        .map(|(network, waypoints)| {
            Ok(RouteRequest {
                network: parse_network(network)?,
                waypoints: to_coordinates(waypoints),
            })
        })
        .collect::<PyResult<Vec<_>>>()?;

    let results = py.detach(|| route_batch(&requests, &config));

    // Failures were already logged by `route_batch`.
    results
        .iter()
        .map(|result| match result {
            Ok(result) => result_to_py(py, result).map(Some),
            Err(_) => Ok(None),
        })
        .collect()
}
