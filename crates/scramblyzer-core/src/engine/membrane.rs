use super::error::EngineError;
use crate::core::lipids::composition::LipidComposition;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::{Axis, center_along};

/// Estimates the position of the membrane midplane along the normal.
///
/// The center is the unweighted mean coordinate of all lipid atoms. The
/// atoms are assumed to lie within one periodic image; a membrane split across
/// the box boundary along the normal gives a meaningless center.
#[derive(Debug, Clone, Copy)]
pub struct MembraneCenterEstimator<'a> {
    lipid_atoms: &'a [usize],
    axis: Axis,
}

impl<'a> MembraneCenterEstimator<'a> {
    pub fn new(lipid_atoms: &'a [usize], axis: Axis) -> Self {
        Self { lipid_atoms, axis }
    }

    pub fn from_composition(composition: &'a LipidComposition, axis: Axis) -> Self {
        Self::new(composition.all_lipid_atoms(), axis)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Computes the membrane center for the current frame of `system`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptySelection`] if there are no lipid atoms.
    pub fn estimate(&self, system: &MolecularSystem) -> Result<f64, EngineError> {
        center_along(system.positions_of(self.lipid_atoms), self.axis)
            .ok_or_else(|| EngineError::EmptySelection("lipid atoms".to_string()))
    }
}
