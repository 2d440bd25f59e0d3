//! # Scramblyzer Core Library
//!
//! Analysis of lipid leaflet occupancy in molecular dynamics simulations of
//! membranes: leaflet composition over time, scrambling rates relative to an
//! initial state, and detection of lipid flip-flops.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`), file
//!   readers for GRO structures, trajectories and NDX index files, atom selection
//!   queries and lipid type resolution.
//!
//! - **[`engine`]: The Logic Core.** Membrane center estimation, leaflet
//!   classification and the stateful trackers (`FlipFlopTracker`,
//!   `ScramblingRateTracker`) that carry per-lipid state across frames.
//!
//! - **[`workflows`]: The Public API.** Complete analyses that read a trajectory
//!   frame by frame, drive the `engine` and stream results to the caller.

pub mod core;
pub mod engine;
pub mod workflows;
