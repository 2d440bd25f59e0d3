pub mod composition;
pub mod flipflops;
pub mod positions;
pub mod rate;

use crate::config::InputSettings;
use crate::error::{CliError, Result};
use scramblyzer::core::io::gro::{GroFile, GroTrajectory};
use scramblyzer::core::io::ndx::IndexGroups;
use scramblyzer::core::io::traits::MolecularFile;
use scramblyzer::core::lipids::composition::LipidComposition;
use scramblyzer::core::lipids::registry::LipidRegistry;
use scramblyzer::core::models::system::MolecularSystem;
use scramblyzer::workflows;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Structure and auxiliary inputs every subcommand starts from.
pub struct LoadedInput {
    pub system: MolecularSystem,
    pub groups: Option<IndexGroups>,
    pub registry: LipidRegistry,
}

impl LoadedInput {
    pub fn load(settings: &InputSettings) -> Result<Self> {
        info!("Loading input structure from {:?}", &settings.structure);
        let system = GroFile::read_from_path(&settings.structure)
            .map_err(|e| CliError::parsing(&settings.structure, e))?;
        info!(atoms = system.atom_count(), "Structure loaded.");

        let groups = match &settings.index {
            Some(path) => {
                let groups = IndexGroups::read_from_path(path, system.atom_count())
                    .map_err(|e| CliError::parsing(path, e))?;
                info!("Read {} index groups from {:?}", groups.len(), path);
                Some(groups)
            }
            None => None,
        };

        let mut registry = LipidRegistry::new();
        if let Some(path) = &settings.lipids {
            let added = registry
                .extend_from_path(path)
                .map_err(|e| CliError::parsing(path, e))?;
            info!("Added {} lipid names from {:?}", added, path);
        }

        Ok(Self {
            system,
            groups,
            registry,
        })
    }

    pub fn resolve_lipids(&self, heads: &str) -> Result<LipidComposition> {
        Ok(workflows::resolve_lipids(
            &self.system,
            self.groups.as_ref(),
            &self.registry,
            heads,
        )?)
    }
}

pub fn open_trajectory(path: &Path) -> Result<GroTrajectory<BufReader<File>>> {
    info!("Opening trajectory {:?}", path);
    GroTrajectory::open(path).map_err(|e| CliError::parsing(path, e))
}

/// Echoes the resolved inputs in the style of a parameter block.
pub fn print_inputs(title: &str, settings: &InputSettings, trajectory: Option<&Path>) {
    let display = |path: Option<&Path>| {
        path.map_or_else(|| "-".to_string(), |p| p.display().to_string())
    };
    println!("Parameters for {}:", title);
    println!(">>> structure:        {}", settings.structure.display());
    println!(">>> trajectory:       {}", display(trajectory));
    println!(">>> index file:       {}", display(settings.index.as_deref()));
    println!(">>> lipid names:      {}", display(settings.lipids.as_deref()));
    println!(">>> lipid heads:      {}", settings.heads);
    println!(">>> membrane normal:  {}", settings.axis);
}
