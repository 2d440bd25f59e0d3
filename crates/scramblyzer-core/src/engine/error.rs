use thiserror::Error;

use super::config::ConfigError;
use crate::core::lipids::composition::CompositionError;
use crate::core::selection::query::QueryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Lipid composition could not be resolved: {0}")]
    Composition(#[from] CompositionError),

    #[error("Atom selection failed: {0}")]
    Selection(#[from] QueryError),

    #[error("Selection '{0}' matches no atoms")]
    EmptySelection(String),

    #[error(
        "Time step between analyzed frames must not exceed {max_gap_ps} ps (previous frame: {previous_ps} ps, current frame: {current_ps} ps)"
    )]
    FrameGap {
        previous_ps: f64,
        current_ps: f64,
        max_gap_ps: f64,
    },

    #[error("Frame time must increase (previous frame: {previous_ps} ps, current frame: {current_ps} ps)")]
    NonMonotonicTime { previous_ps: f64, current_ps: f64 },

    #[error("Atom index {index} is out of range for a system of {atom_count} atoms")]
    AtomIndexOutOfRange { index: usize, atom_count: usize },

    #[error("Trajectory reading failed: {0}")]
    Trajectory(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to write results: {0}")]
    Output(#[from] std::io::Error),
}
