use serde::{Deserialize, Serialize};

use crate::spatial::{NeighborSearch, SnapMode};

/// Spacing of densified waypoints when none is configured explicitly
pub const DEFAULT_DENSIFY_SPACING_M: f64 = 200.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Insert intermediate waypoints every this many meters before snapping.
    /// `None` routes the waypoints as given.
    pub densify_spacing_m: Option<f64>,
    pub snap_mode: SnapMode,
    pub neighbor_search: NeighborSearch,
}

impl RouteConfig {
    pub fn densified() -> Self {
        Self {
            densify_spacing_m: Some(DEFAULT_DENSIFY_SPACING_M),
            ..Self::default()
        }
    }
}
