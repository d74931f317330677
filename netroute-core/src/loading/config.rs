use serde::{Deserialize, Serialize};

use crate::spatial::NeighborSearch;

/// Gap closed by pairwise stitching unless configured otherwise
pub const DEFAULT_STITCH_THRESHOLD_KM: f64 = 0.1;

/// Strategy for joining line ends that nearly, but not exactly, coincide.
/// At most one strategy runs per build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StitchingStrategy {
    None,
    /// Join every pair of vertices within `threshold_km` of each other.
    PairwiseThreshold { threshold_km: f64 },
    /// Join a line's last coordinate to the closest first coordinate of
    /// another line, when that first coordinate agrees the line end is its
    /// closest and the gap is at most `max_gap_km`.
    LineEndChaining { max_gap_km: f64 },
}

impl Default for StitchingStrategy {
    fn default() -> Self {
        Self::PairwiseThreshold {
            threshold_km: DEFAULT_STITCH_THRESHOLD_KM,
        }
    }
}

/// Whether polygon rings take part in the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonHandling {
    /// Polygons contribute nothing.
    #[default]
    Exclude,
    /// Every ring (exterior and holes) becomes a closed polyline.
    Boundary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub stitching: StitchingStrategy,
    pub neighbor_search: NeighborSearch,
    pub polygons: PolygonHandling,
}

impl GraphConfig {
    pub fn unstitched() -> Self {
        Self {
            stitching: StitchingStrategy::None,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_pairwise_stitching_at_100_m() {
        let config = GraphConfig::default();
        assert_eq!(
            config.stitching,
            StitchingStrategy::PairwiseThreshold { threshold_km: 0.1 }
        );
        assert_eq!(config.polygons, PolygonHandling::Exclude);
        assert_eq!(config.neighbor_search, NeighborSearch::BruteForce);
    }

    #[test]
    fn deserializes_tagged_strategy() {
        let config: GraphConfig = serde_json::from_str(
            r#"{"stitching": {"strategy": "line_end_chaining", "max_gap_km": 0.25},
                "neighbor_search": "rtree"}"#,
        )
        .unwrap();
        assert_eq!(
            config.stitching,
            StitchingStrategy::LineEndChaining { max_gap_km: 0.25 }
        );
        assert_eq!(config.neighbor_search, NeighborSearch::RTree);
        assert_eq!(config.polygons, PolygonHandling::Exclude);

        let none: StitchingStrategy = serde_json::from_str(r#"{"strategy": "none"}"#).unwrap();
        assert_eq!(none, StitchingStrategy::None);
    }
}
