//! Provides input functionality for simulation file formats.
//!
//! This module contains readers for GROMACS structure files, multi-frame
//! trajectories and index files, behind a small trait-based interface that the
//! analysis workflows are written against.

pub mod gro;
pub mod ndx;
pub mod traits;
