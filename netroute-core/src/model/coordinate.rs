//! Geographic coordinates and their exact vertex identity

use std::fmt;

use geo::{Coord, Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// A WGS84 position, `x` is longitude and `y` is latitude (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate(pub Coord<f64>);

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self(Coord { x: lon, y: lat })
    }

    pub fn lon(&self) -> f64 {
        self.0.x
    }

    pub fn lat(&self) -> f64 {
        self.0.y
    }

    pub fn point(&self) -> Point<f64> {
        Point(self.0)
    }

    pub fn is_finite(&self) -> bool {
        self.0.x.is_finite() && self.0.y.is_finite()
    }

    /// Exact identity of this coordinate as a graph vertex.
    pub fn key(&self) -> VertexKey {
        VertexKey::from(*self)
    }

    /// Great-circle distance in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        Haversine.distance(self.point(), other.point()) / 1000.0
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0.x, self.0.y)
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(coord: Coord<f64>) -> Self {
        Self(coord)
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Self {
        Self(point.0)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coord: Coordinate) -> Self {
        (coord.0.x, coord.0.y)
    }
}

impl From<Coordinate> for Coord<f64> {
    fn from(coord: Coordinate) -> Self {
        coord.0
    }
}

/// Hashable vertex identity built from the raw bit patterns of a coordinate.
///
/// Two coordinates map to the same vertex only when both components are
/// bit-for-bit equal. Negative zero is folded into positive zero, since the
/// two are indistinguishable once written out as decimal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey {
    x: u64,
    y: u64,
}

impl From<Coordinate> for VertexKey {
    fn from(coord: Coordinate) -> Self {
        let canonical = |v: f64| if v == 0.0 { 0.0f64 } else { v };
        Self {
            x: canonical(coord.0.x).to_bits(),
            y: canonical(coord.0.y).to_bits(),
        }
    }
}
