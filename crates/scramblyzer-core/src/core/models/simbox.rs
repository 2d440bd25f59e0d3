use crate::core::utils::geometry::Axis;
use nalgebra::Vector3;

/// Orthogonal periodic simulation box.
///
/// Only the diagonal of the box is stored. The leaflet analysis needs nothing
/// but the box length along the membrane normal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimBox {
    /// Box lengths along x, y and z in nanometers.
    pub dimensions: Vector3<f64>,
}

impl SimBox {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            dimensions: Vector3::new(x, y, z),
        }
    }

    /// Box length along the given axis.
    #[inline]
    pub fn length(&self, axis: Axis) -> f64 {
        self.dimensions[axis.index()]
    }

    /// Returns `true` if every box dimension is a positive finite number.
    pub fn is_valid(&self) -> bool {
        self.dimensions.iter().all(|&d| d.is_finite() && d > 0.0)
    }
}
