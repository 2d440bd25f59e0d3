use crate::cli::{Cli, Commands, InputArgs};
use crate::error::{CliError, Result};
use scramblyzer::core::utils::geometry::Axis;
use scramblyzer::engine::config::{
    AnalysisConfig, AnalysisConfigBuilder, FlipFlopConfig, FlipFlopConfigBuilder,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_HEADS: &str = "name PO4";
const DEFAULT_INDEX: &str = "index.ndx";
const DEFAULT_LIPIDS: &str = "lipids.txt";
const DEFAULT_COMPOSITION_STEP_NS: f64 = 1.0;
const DEFAULT_RATE_STEP_NS: f64 = 10.0;
const DEFAULT_POSITIONS_STEP_NS: f64 = 1.0;
const DEFAULT_SPATIAL_LIMIT: f64 = 1.5;
const DEFAULT_TEMPORAL_LIMIT: u32 = 10;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialStepConfig {
    time_step: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialFlipFlopConfig {
    spatial_limit: Option<f64>,
    temporal_limit: Option<u32>,
    frame_step: Option<f64>,
}

/// Settings loaded from a TOML file; every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialConfig {
    axis: Option<Axis>,
    heads: Option<String>,
    index: Option<PathBuf>,
    lipids: Option<PathBuf>,
    composition: Option<PartialStepConfig>,
    rate: Option<PartialStepConfig>,
    positions: Option<PartialStepConfig>,
    flipflops: Option<PartialFlipFlopConfig>,
}

/// Inputs common to every analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSettings {
    pub structure: PathBuf,
    pub index: Option<PathBuf>,
    pub lipids: Option<PathBuf>,
    pub heads: String,
    pub axis: Axis,
}

/// Settings of the analyses driven by a fixed time step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSettings {
    pub input: InputSettings,
    pub trajectory: Option<PathBuf>,
    pub output: PathBuf,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlipFlopSettings {
    pub input: InputSettings,
    pub trajectory: PathBuf,
    pub events: Option<PathBuf>,
    pub analysis: FlipFlopConfig,
}

/// Fully resolved settings of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Settings {
    Composition(StepSettings),
    Rate(StepSettings),
    FlipFlops(FlipFlopSettings),
    Positions(StepSettings),
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

/// Uses `explicit` if given (it must exist), otherwise `default` if it exists.
fn resolve_optional_file(explicit: Option<&Path>, default: &str) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(CliError::Config(format!(
            "File does not exist: {}",
            path.display()
        ))),
        None => {
            let path = PathBuf::from(default);
            if path.exists() {
                Ok(Some(path))
            } else {
                debug!("Optional file '{}' not found, continuing without it.", default);
                Ok(None)
            }
        }
    }
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::parsing(path, e))
    }

    /// Loads `path` if given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Resolves the final settings.
    ///
    /// Command-line flags take precedence over `-S` overrides, which take
    /// precedence over the configuration file and finally the defaults.
    pub fn merge_with_cli(mut self, cli: &Cli) -> Result<Settings> {
        self.apply_set_values(&cli.set_values)?;
        let axis = cli.axis.or(self.axis).unwrap_or_default();

        let settings = match &cli.command {
            Commands::Composition(args) => Settings::Composition(StepSettings {
                input: self.merge_input(cli, &args.input, axis)?,
                trajectory: args.trajectory.clone(),
                output: args
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("composition.xvg")),
                analysis: Self::analysis_config(
                    axis,
                    args.time_step,
                    self.composition.as_ref(),
                    DEFAULT_COMPOSITION_STEP_NS,
                )?,
            }),
            Commands::Rate(args) => Settings::Rate(StepSettings {
                input: self.merge_input(cli, &args.input, axis)?,
                trajectory: Some(args.trajectory.clone()),
                output: args
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("rate.xvg")),
                analysis: Self::analysis_config(
                    axis,
                    args.time_step,
                    self.rate.as_ref(),
                    DEFAULT_RATE_STEP_NS,
                )?,
            }),
            Commands::Positions(args) => Settings::Positions(StepSettings {
                input: self.merge_input(cli, &args.input, axis)?,
                trajectory: Some(args.trajectory.clone()),
                output: args
                    .output
                    .clone()
                    .unwrap_or_else(|| PathBuf::from("positions.xvg")),
                analysis: Self::analysis_config(
                    axis,
                    args.time_step,
                    self.positions.as_ref(),
                    DEFAULT_POSITIONS_STEP_NS,
                )?,
            }),
            Commands::Flipflops(args) => {
                let file = self.flipflops.take().unwrap_or_default();
                let analysis = FlipFlopConfigBuilder::new()
                    .axis(axis)
                    .spatial_limit(
                        args.spatial_limit
                            .or(file.spatial_limit)
                            .unwrap_or(DEFAULT_SPATIAL_LIMIT),
                    )
                    .temporal_limit(
                        args.temporal_limit
                            .or(file.temporal_limit)
                            .unwrap_or(DEFAULT_TEMPORAL_LIMIT),
                    )
                    .frame_step_ns(
                        args.frame_step
                            .or(file.frame_step)
                            .unwrap_or(FlipFlopConfigBuilder::DEFAULT_FRAME_STEP_NS),
                    )
                    .build()
                    .map_err(|e| CliError::Config(e.to_string()))?;
                Settings::FlipFlops(FlipFlopSettings {
                    input: self.merge_input(cli, &args.input, axis)?,
                    trajectory: args.trajectory.clone(),
                    events: args.events.clone(),
                    analysis,
                })
            }
        };

        debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    fn merge_input(&self, cli: &Cli, args: &InputArgs, axis: Axis) -> Result<InputSettings> {
        let heads = args
            .heads
            .clone()
            .or_else(|| self.heads.clone())
            .unwrap_or_else(|| DEFAULT_HEADS.to_string());
        if heads.trim().is_empty() {
            return Err(CliError::Argument(
                "The lipid head selection must not be empty.".to_string(),
            ));
        }

        Ok(InputSettings {
            structure: args.structure.clone(),
            index: resolve_optional_file(
                args.index.as_deref().or(self.index.as_deref()),
                DEFAULT_INDEX,
            )?,
            lipids: resolve_optional_file(
                cli.lipids.as_deref().or(self.lipids.as_deref()),
                DEFAULT_LIPIDS,
            )?,
            heads,
            axis,
        })
    }

    fn analysis_config(
        axis: Axis,
        cli_step: Option<f64>,
        file: Option<&PartialStepConfig>,
        default_step: f64,
    ) -> Result<AnalysisConfig> {
        let step = cli_step
            .or(file.and_then(|f| f.time_step))
            .unwrap_or(default_step);
        AnalysisConfigBuilder::new()
            .axis(axis)
            .time_step_ns(step)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "axis" => self.axis = Some(parse_value(key, value)?),
                "heads" => self.heads = Some(value.to_string()),
                "index" => self.index = Some(PathBuf::from(value)),
                "lipids" => self.lipids = Some(PathBuf::from(value)),
                "composition.time-step" => {
                    self.composition
                        .get_or_insert_with(Default::default)
                        .time_step = Some(parse_value(key, value)?);
                }
                "rate.time-step" => {
                    self.rate.get_or_insert_with(Default::default).time_step =
                        Some(parse_value(key, value)?);
                }
                "positions.time-step" => {
                    self.positions
                        .get_or_insert_with(Default::default)
                        .time_step = Some(parse_value(key, value)?);
                }
                "flipflops.spatial-limit" => {
                    self.flipflops
                        .get_or_insert_with(Default::default)
                        .spatial_limit = Some(parse_value(key, value)?);
                }
                "flipflops.temporal-limit" => {
                    self.flipflops
                        .get_or_insert_with(Default::default)
                        .temporal_limit = Some(parse_value(key, value)?);
                }
                "flipflops.frame-step" => {
                    self.flipflops
                        .get_or_insert_with(Default::default)
                        .frame_step = Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
