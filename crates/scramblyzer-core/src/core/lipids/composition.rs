use super::registry::LipidRegistry;
use crate::core::models::system::MolecularSystem;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositionError {
    #[error("No lipids with head atoms were found in the system")]
    NoLipids,
}

/// One lipid type present in the system together with its head atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LipidType {
    pub name: String,
    /// Indices of the head-group atoms, one per lipid molecule, in ascending order.
    pub heads: Vec<usize>,
}

impl LipidType {
    pub fn new(name: impl Into<String>, heads: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            heads,
        }
    }

    pub fn head_count(&self) -> usize {
        self.heads.len()
    }
}

/// The lipid make-up of a system, fixed for the whole analysis run.
///
/// `all_lipid_atoms` covers every atom of every recognised lipid residue
/// (including types that were excluded for lacking head atoms) and is used for
/// the membrane center. `lipid_types` lists only the types that are analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LipidComposition {
    all_lipid_atoms: Vec<usize>,
    lipid_types: Vec<LipidType>,
}

impl LipidComposition {
    /// Builds a composition from already resolved parts.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::NoLipids`] if `lipid_types` is empty.
    pub fn new(
        all_lipid_atoms: Vec<usize>,
        lipid_types: Vec<LipidType>,
    ) -> Result<Self, CompositionError> {
        if lipid_types.is_empty() {
            return Err(CompositionError::NoLipids);
        }
        Ok(Self {
            all_lipid_atoms,
            lipid_types,
        })
    }

    /// Resolves lipid types and their head atoms in `system`.
    ///
    /// Lipid types appear in the order in which their first atom occurs in the
    /// system. A type whose atoms contain none of `heads` is excluded with a
    /// warning.
    ///
    /// # Arguments
    ///
    /// * `system` - The structure to analyze.
    /// * `registry` - Residue names that are treated as lipids.
    /// * `heads` - Indices of the atoms selected as lipid head identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::NoLipids`] if no lipid type with head atoms remains.
    pub fn resolve(
        system: &MolecularSystem,
        registry: &LipidRegistry,
        heads: &[usize],
    ) -> Result<Self, CompositionError> {
        let head_set: HashSet<usize> = heads.iter().copied().collect();

        let mut all_lipid_atoms = Vec::new();
        // (name, atom count, head indices)
        let mut found: Vec<(String, usize, Vec<usize>)> = Vec::new();

        for (index, atom) in system.atoms_iter() {
            if !registry.contains(&atom.residue_name) {
                continue;
            }
            all_lipid_atoms.push(index);

            let entry = match found.iter().position(|(name, _, _)| *name == atom.residue_name) {
                Some(position) => &mut found[position],
                None => {
                    found.push((atom.residue_name.clone(), 0, Vec::new()));
                    let last = found.len() - 1;
                    &mut found[last]
                }
            };
            entry.1 += 1;
            if head_set.contains(&index) {
                entry.2.push(index);
            }
        }

        let mut lipid_types = Vec::with_capacity(found.len());
        for (name, atom_count, type_heads) in found {
            if type_heads.is_empty() {
                warn!(
                    "{} atoms were found for {} lipids but none of them is a lipid head identifier. Lipids of type {} will not be included in the analysis.",
                    atom_count, name, name
                );
                continue;
            }
            debug!(lipid = %name, atoms = atom_count, heads = type_heads.len(), "Resolved lipid type.");
            lipid_types.push(LipidType::new(name, type_heads));
        }

        Self::new(all_lipid_atoms, lipid_types)
    }

    pub fn all_lipid_atoms(&self) -> &[usize] {
        &self.all_lipid_atoms
    }

    pub fn lipid_types(&self) -> &[LipidType] {
        &self.lipid_types
    }

    pub fn lipid_type(&self, name: &str) -> Option<&LipidType> {
        self.lipid_types.iter().find(|t| t.name == name)
    }

    pub fn type_count(&self) -> usize {
        self.lipid_types.len()
    }

    pub fn head_count(&self) -> usize {
        self.lipid_types.iter().map(LipidType::head_count).sum()
    }

    /// Aggregate rows are reported only when more than one lipid type is analyzed.
    pub fn has_aggregate(&self) -> bool {
        self.lipid_types.len() >= 2
    }
}
