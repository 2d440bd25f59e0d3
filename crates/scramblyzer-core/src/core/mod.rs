//! # Core Module
//!
//! This module provides the data structures and input handling that the
//! leaflet analyses are built on.
//!
//! ## Architecture
//!
//! - **System Representation** ([`models`]) - Atoms, periodic box and frame time
//! - **File I/O** ([`io`]) - GRO structures and trajectories, NDX index groups
//! - **Atom Selection** ([`selection`]) - Query language for choosing head-group atoms
//! - **Lipid Resolution** ([`lipids`]) - Lipid residue names and per-type head atoms
//! - **Utilities** ([`utils`]) - Periodic geometry and name patterns
//!
//! Nothing in this layer keeps state across frames; that is the job of the
//! trackers in [`crate::engine`].

pub mod io;
pub mod lipids;
pub mod models;
pub mod selection;
pub mod utils;
