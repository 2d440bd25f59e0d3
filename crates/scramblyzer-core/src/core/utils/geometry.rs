use nalgebra::Point3;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Cartesian axis, used to select the membrane normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    /// Index of the axis into a 3D vector.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Component of a point along this axis.
    #[inline]
    pub fn component(self, point: &Point3<f64>) -> f64 {
        point[self.index()]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid axis '{0}'. Expected one of 'x', 'y', 'z'.")]
pub struct ParseAxisError(String);

impl FromStr for Axis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Signed minimum-image distance `a - b` along one periodic dimension.
///
/// The result lies in `(-L/2, L/2]`. The difference is folded through at most
/// one period, so positions must already be within one box length of each
/// other. If `box_length` is not a positive finite number the raw difference
/// is returned.
#[inline]
pub fn periodic_distance(a: f64, b: f64, box_length: f64) -> f64 {
    let diff = a - b;
    if !(box_length.is_finite() && box_length > 0.0) {
        return diff;
    }

    let half = box_length / 2.0;
    if diff > half {
        diff - box_length
    } else if diff <= -half {
        diff + box_length
    } else {
        diff
    }
}

/// Unweighted mean of the coordinates of the given points along `axis`.
///
/// Returns `None` for an empty set of points.
pub fn center_along<'a>(
    positions: impl IntoIterator<Item = &'a Point3<f64>>,
    axis: Axis,
) -> Option<f64> {
    let (sum, count) = positions
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), p| {
            (sum + axis.component(p), count + 1)
        });
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
