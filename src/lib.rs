use pyo3::prelude::*;

use graph::PyNetworkGraph;
use routing::{route, route_many};

pub mod graph;
mod options;
pub mod routing;

/// A Python module implemented in Rust.
#[pymodule]
fn netroute(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyNetworkGraph>()?;
    m.add_function(wrap_pyfunction!(route, m)?)?;
    m.add_function(wrap_pyfunction!(route_many, m)?)?;
    Ok(())
}
