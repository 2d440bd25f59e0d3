//! # Workflows Module
//!
//! This module provides the end-to-end analyses offered by Scramblyzer. Each
//! workflow reads frames from a trajectory, skips frames the frame selector
//! rejects, and hands per-frame results to a caller-provided sink as soon as
//! they are available.
//!
//! ## Architecture
//!
//! - **Leaflet Composition** ([`composition`]) - Upper/lower head counts per lipid type
//! - **Scrambling Rate** ([`rate`]) - Share of lipids away from their initial leaflet
//! - **Flip-Flops** ([`flipflops`]) - Sustained leaflet transitions of individual lipids
//! - **Head Positions** ([`positions`]) - Raw head coordinates along the membrane normal
//!
//! A sink that fails aborts the workflow with [`EngineError::Output`]; rows
//! written before the failure stay written.

pub mod composition;
pub mod flipflops;
pub mod positions;
pub mod rate;

use crate::core::io::ndx::IndexGroups;
use crate::core::io::traits::TrajectoryReader;
use crate::core::lipids::composition::LipidComposition;
use crate::core::lipids::registry::LipidRegistry;
use crate::core::models::system::MolecularSystem;
use crate::core::selection::query::AtomQuery;
use crate::engine::error::EngineError;
use crate::engine::frames::FrameSelector;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::info;

/// Selects the atoms matching `query`, failing if nothing matches.
pub fn select_atoms(
    system: &MolecularSystem,
    groups: Option<&IndexGroups>,
    query: &str,
) -> Result<Vec<usize>, EngineError> {
    let indices = AtomQuery::parse(query)?.select(system, groups)?;
    if indices.is_empty() {
        return Err(EngineError::EmptySelection(query.to_string()));
    }
    Ok(indices)
}

/// Resolves the lipid types of `system` and their head atoms.
///
/// # Arguments
///
/// * `system` - The structure to analyze.
/// * `groups` - Index groups available to the head query.
/// * `registry` - Residue names treated as lipids.
/// * `heads_query` - Selection of the lipid head identifiers, e.g. `name PO4`.
///
/// # Errors
///
/// Returns an error if the query is invalid, matches nothing, or no lipid type
/// with head atoms is found.
pub fn resolve_lipids(
    system: &MolecularSystem,
    groups: Option<&IndexGroups>,
    registry: &LipidRegistry,
    heads_query: &str,
) -> Result<LipidComposition, EngineError> {
    let heads = select_atoms(system, groups, heads_query)?;
    let composition = LipidComposition::resolve(system, registry, &heads)?;
    info!(
        lipid_types = composition.type_count(),
        heads = composition.head_count(),
        lipid_atoms = composition.all_lipid_atoms().len(),
        "Resolved lipid composition."
    );
    Ok(composition)
}

/// Reads all frames of `trajectory` into `system` and calls `analyze` for every
/// frame accepted by `selector`.
///
/// # Return
///
/// Returns the number of analyzed frames.
pub(crate) fn for_each_frame<T, F>(
    system: &mut MolecularSystem,
    trajectory: &mut T,
    selector: FrameSelector,
    reporter: &ProgressReporter,
    mut analyze: F,
) -> Result<usize, EngineError>
where
    T: TrajectoryReader,
    F: FnMut(&MolecularSystem) -> Result<(), EngineError>,
{
    let mut analyzed = 0;
    while trajectory
        .read_next_frame(system)
        .map_err(|e| EngineError::Trajectory(Box::new(e)))?
    {
        let accepted = selector.accepts(system.time());
        reporter.report(Progress::FrameRead {
            step: system.step(),
            time_ps: system.time(),
            analyzed: accepted,
        });
        if !accepted {
            continue;
        }
        analyze(system)?;
        analyzed += 1;
    }
    info!(frames = analyzed, "Finished reading trajectory.");
    Ok(analyzed)
}
