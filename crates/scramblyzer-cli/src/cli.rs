use clap::{Args, Parser, Subcommand};
use scramblyzer::core::utils::geometry::Axis;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Ladislav Bartos",
    version,
    about = "Scramblyzer - Analysis of lipid scrambling in coarse-grained membrane simulations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S flipflops.spatial-limit=2.0
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    /// Membrane normal (x, y or z). Defaults to z.
    #[arg(long, global = true, value_name = "AXIS")]
    pub axis: Option<Axis>,

    /// File with additional lipid residue names, one per line.
    /// Defaults to 'lipids.txt' if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub lipids: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count lipid heads in the upper and lower membrane leaflet.
    Composition(CompositionArgs),
    /// Calculate the percentage of scrambled lipids in time.
    Rate(RateArgs),
    /// Detect flip-flop events of individual lipids.
    Flipflops(FlipFlopArgs),
    /// Record positions of lipid heads along the membrane normal in time.
    Positions(PositionsArgs),
}

/// Input arguments shared by all subcommands.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path to the input structure in GRO format.
    #[arg(short = 'c', long, required = true, value_name = "PATH")]
    pub structure: PathBuf,

    /// Path to an index file. Defaults to 'index.ndx' if present.
    #[arg(short = 'n', long, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// Selection of lipid head identifiers. Defaults to 'name PO4'.
    #[arg(short = 'p', long, value_name = "QUERY")]
    pub heads: Option<String>,
}

/// Arguments for the `composition` subcommand.
#[derive(Args, Debug)]
pub struct CompositionArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path to a multi-frame GRO trajectory. Without it, only the structure is analyzed.
    #[arg(short = 'f', long, value_name = "PATH")]
    pub trajectory: Option<PathBuf>,

    /// Output file (.xvg or .csv). Defaults to 'composition.xvg'.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Time between analyzed frames in ns. Defaults to 1.
    #[arg(short = 't', long, value_name = "NS")]
    pub time_step: Option<f64>,
}

/// Arguments for the `rate` subcommand.
#[derive(Args, Debug)]
pub struct RateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path to a multi-frame GRO trajectory.
    #[arg(short = 'f', long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Output file (.xvg or .csv). Defaults to 'rate.xvg'.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Time between analyzed frames in ns. Defaults to 10.
    #[arg(short = 't', long, value_name = "NS")]
    pub time_step: Option<f64>,
}

/// Arguments for the `flipflops` subcommand.
#[derive(Args, Debug)]
pub struct FlipFlopArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path to a multi-frame GRO trajectory.
    #[arg(short = 'f', long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Distance from the membrane center (nm) marking the leaflet cores. Defaults to 1.5.
    #[arg(short = 's', long, value_name = "NM")]
    pub spatial_limit: Option<f64>,

    /// Number of consecutive frames needed to confirm a flip-flop. Defaults to 10.
    #[arg(short = 't', long, value_name = "FRAMES")]
    pub temporal_limit: Option<u32>,

    /// Time between analyzed frames in ns. Defaults to 1.
    #[arg(long, value_name = "NS")]
    pub frame_step: Option<f64>,

    /// Write every detected flip-flop event to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub events: Option<PathBuf>,
}

/// Arguments for the `positions` subcommand.
#[derive(Args, Debug)]
pub struct PositionsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path to a multi-frame GRO trajectory.
    #[arg(short = 'f', long, required = true, value_name = "PATH")]
    pub trajectory: PathBuf,

    /// Output file (.xvg or .csv). Defaults to 'positions.xvg'.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Time between analyzed frames in ns. Defaults to 1.
    #[arg(short = 't', long, value_name = "NS")]
    pub time_step: Option<f64>,
}
