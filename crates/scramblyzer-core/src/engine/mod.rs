//! # Engine Module
//!
//! This module implements the per-frame analysis logic of Scramblyzer: where the
//! membrane center is, which leaflet each lipid head occupies, and how leaflet
//! occupancy evolves across a trajectory.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated analysis parameters and their builders
//! - **Frame Selection** ([`frames`]) - Which trajectory frames are analyzed
//! - **Membrane Center** ([`membrane`]) - Midplane position along the membrane normal
//! - **Classification** ([`leaflet`]) - Sides, zones and per-type leaflet counts
//! - **Flip-Flops** ([`flipflop`]) - Hysteresis automaton detecting sustained leaflet changes
//! - **Scrambling** ([`scrambling`]) - Share of lipids away from their initial leaflet
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! Trackers own their per-atom state and borrow the lipid composition, which
//! stays fixed for the whole run. Frames are processed strictly in order.

pub mod config;
pub mod error;
pub mod flipflop;
pub mod frames;
pub mod leaflet;
pub mod membrane;
pub mod progress;
pub mod scrambling;
