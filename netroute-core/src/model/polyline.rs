use geo::LineString;
use itertools::Itertools;

use super::Coordinate;

/// Ordered run of at least two finite coordinates, without direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    coords: Vec<Coordinate>,
}

impl Polyline {
    /// Drops non-finite coordinates and returns `None` when fewer than two remain.
    pub fn new(coords: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        let coords: Vec<_> = coords.into_iter().filter(Coordinate::is_finite).collect();
        (coords.len() >= 2).then_some(Self { coords })
    }

    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn first(&self) -> Coordinate {
        self.coords[0]
    }

    pub fn last(&self) -> Coordinate {
        self.coords[self.coords.len() - 1]
    }

    /// Consecutive coordinate pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        self.coords.iter().copied().tuple_windows()
    }

    pub fn length_km(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance_km(&b)).sum()
    }
}

impl TryFrom<&LineString<f64>> for Polyline {
    type Error = ();

    fn try_from(line: &LineString<f64>) -> Result<Self, Self::Error> {
        Polyline::new(line.coords().map(|c| Coordinate::from(*c))).ok_or(())
    }
}

impl From<&Polyline> for LineString<f64> {
    fn from(polyline: &Polyline) -> Self {
        polyline.coords.iter().map(|c| c.0).collect()
    }
}
