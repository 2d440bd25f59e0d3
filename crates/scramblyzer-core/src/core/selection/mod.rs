//! Atom selection queries.
//!
//! Queries such as `name PO4`, `resname POPC and not resid 1-10` or bare index
//! group names are parsed once into an [`query::AtomQuery`] tree and then
//! evaluated against a [`MolecularSystem`](crate::core::models::system::MolecularSystem).

pub mod query;
