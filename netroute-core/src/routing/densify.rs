use geo::{Haversine, InterpolatableLine, Line};
use itertools::Itertools;

use crate::{Error, model::Coordinate};

/// Relative slack so a leg that is a whole multiple of the spacing does not
/// gain an extra step from rounding in the distance calculation.
const STEP_TOLERANCE: f64 = 1e-6;

/// Smallest accepted spacing between densified points
pub const MIN_DENSIFY_SPACING_M: f64 = 1.0;

/// Upper bound on the number of points a single densification may produce
pub const MAX_DENSIFIED_POINTS: usize = 100_000;

/// Inserts evenly spaced points along the great circle between consecutive
/// waypoints, so that no two successive points are more than `spacing_m`
/// apart. Exact repeats of the previous point are dropped.
///
/// Fails with [`Error::InvalidData`] when `spacing_m` is not a finite value
/// of at least [`MIN_DENSIFY_SPACING_M`], or when the result would exceed
/// [`MAX_DENSIFIED_POINTS`].
pub fn densify(waypoints: &[Coordinate], spacing_m: f64) -> Result<Vec<Coordinate>, Error> {
    if !spacing_m.is_finite() || spacing_m < MIN_DENSIFY_SPACING_M {
        return Err(Error::InvalidData(format!(
            "Densify spacing must be at least {MIN_DENSIFY_SPACING_M} m, got {spacing_m}"
        )));
    }

    let mut points = Vec::with_capacity(waypoints.len());
    if let Some(first) = waypoints.first() {
        points.push(*first);
    }

    for (a, b) in waypoints.iter().copied().tuple_windows() {
        let leg_m = a.distance_km(&b) * 1000.0;
        let steps = ((leg_m / spacing_m) * (1.0 - STEP_TOLERANCE)).ceil().max(1.0);
        if points.len() as f64 + steps > MAX_DENSIFIED_POINTS as f64 {
            return Err(Error::InvalidData(format!(
                "Densifying at {spacing_m} m would produce more than {MAX_DENSIFIED_POINTS} points"
            )));
        }
        let steps = steps as usize;
        let line = Line::new(a.0, b.0);

        for step in 1..steps {
            let ratio = step as f64 / steps as f64;
            push_distinct(
                &mut points,
                Coordinate::from(line.point_at_ratio_from_start(&Haversine, ratio)),
            );
        }
        push_distinct(&mut points, b);
    }

    Ok(points)
}

fn push_distinct(points: &mut Vec<Coordinate>, point: Coordinate) {
    if points.last().is_none_or(|last| last.key() != point.key()) {
        points.push(point);
    }
}
