//! # Core Models Module
//!
//! This module contains the data structures used to represent a simulated
//! membrane system in Scramblyzer.
//!
//! ## Key Components
//!
//! - [`atom`] - Individual atom (or coarse-grained bead) with identity and position
//! - [`simbox`] - Orthogonal periodic simulation box
//! - [`system`] - Complete system: atoms, box, and the time of the current frame
//!
//! ## Usage
//!
//! A system is read once from a structure file and then updated in place by a
//! trajectory reader for every frame.
//!
//! ```ignore
//! use scramblyzer::core::io::{gro::GroFile, traits::MolecularFile};
//!
//! let system = GroFile::read_from_path("system.gro")?;
//! println!("{} atoms, box {:?}", system.atom_count(), system.simbox());
//! ```

pub mod atom;
pub mod simbox;
pub mod system;
