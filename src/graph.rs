use netroute_core::prelude::*;
use pyo3::prelude::*;

use crate::options::{
    graph_config, parse_network, result_to_py, route_config, to_coordinates, to_py_err,
};

/// NetworkGraph
///
/// Routing graph built once from a GeoJSON FeatureCollection of line
/// geometries and reused for any number of routes.
///
/// Vertices are the exact coordinates of the input lines, edges are weighted
/// by great-circle distance in kilometers. Line ends that nearly touch are
/// joined according to ``stitching``.
///
/// Example:
///
/// .. code-block:: python
///
///     graph = NetworkGraph(open("rivers.geojson").read(), stitching="line_end_chaining")
///     result = graph.route([(2.35, 48.85), (2.29, 48.86)])
#[pyclass(name = "NetworkGraph")]
pub struct PyNetworkGraph {
    pub(crate) graph: RoutingGraph,
}

#[pymethods]
impl PyNetworkGraph {
    #[new]
    #[pyo3(signature = (network, stitching="pairwise_threshold", threshold_km=0.1, neighbor_search="brute_force", polygons="exclude"))]
    pub fn new(
        py: Python<'_>,
        network: &str,
        stitching: &str,
        threshold_km: f64,
        neighbor_search: &str,
        polygons: &str,
    ) -> PyResult<Self> {
        let collection = parse_network(network)?;
        let config = graph_config(stitching, threshold_km, neighbor_search, polygons)?;

        let graph = py.detach(|| build_network_graph(&collection, &config));
        Ok(PyNetworkGraph { graph })
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nearest vertex to ``(lon, lat)``, or None when the graph is empty.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        locate(Coordinate::new(lon, lat), &self.graph).map(Into::into)
    }

    /// Shortest path between two vertices of the graph.
    ///
    /// Returns the list of ``(lon, lat)`` coordinates, or None when the
    /// vertices are not connected. Raises ValueError if either coordinate
    /// is not a vertex.
    pub fn shortest_path(
        &self,
        py: Python<'_>,
        start: (f64, f64),
        end: (f64, f64),
    ) -> PyResult<Option<Vec<(f64, f64)>>> {
        match py.detach(|| resolve(&self.graph, start.into(), end.into())) {
            Ok(path) => Ok(Some(path.into_iter().map(Into::into).collect())),
            Err(Error::NoPathFound { .. }) => Ok(None),
            Err(e) => Err(to_py_err(e)),
        }
    }

    /// Routes consecutive waypoint pairs over this graph.
    #[pyo3(signature = (waypoints, densify_spacing_m=None, snap_mode="vertex", neighbor_search="brute_force"))]
    pub fn route(
        &self,
        py: Python<'_>,
        waypoints: Vec<(f64, f64)>,
        densify_spacing_m: Option<f64>,
        snap_mode: &str,
        neighbor_search: &str,
    ) -> PyResult<Py<PyAny>> {
        let config = route_config(densify_spacing_m, snap_mode, neighbor_search)?;
        let waypoints = to_coordinates(&waypoints);

        let result = py
            .detach(|| route_waypoints(&self.graph, &waypoints, &config))
            .map_err(to_py_err)?;
        result_to_py(py, &result)
    }

    fn __repr__(&self) -> String {
        format!(
            "NetworkGraph with {} vertices and {} edges",
            self.graph.vertex_count(),
            self.graph.edge_count()
        )
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }
}
