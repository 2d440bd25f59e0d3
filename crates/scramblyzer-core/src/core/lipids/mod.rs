//! Lipid recognition and per-type head-group resolution.
//!
//! - [`registry`] - Residue names treated as lipids (built-in Martini set plus user additions)
//! - [`composition`] - Mapping of each lipid type present in a system to its head atoms

pub mod composition;
pub mod registry;
