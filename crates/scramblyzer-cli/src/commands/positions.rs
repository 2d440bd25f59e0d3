use super::{LoadedInput, open_trajectory, print_inputs};
use crate::config::StepSettings;
use crate::error::{CliError, Result};
use crate::output::{SeriesHeader, SeriesWriter};
use crate::utils::progress::CliProgressHandler;
use scramblyzer::engine::progress::ProgressReporter;
use scramblyzer::workflows;

pub fn run(settings: StepSettings, progress: &CliProgressHandler) -> Result<()> {
    let trajectory_path = settings.trajectory.as_deref().ok_or_else(|| {
        CliError::Argument("The positions analysis requires a trajectory.".to_string())
    })?;
    print_inputs("Head Positions", &settings.input, Some(trajectory_path));

    let mut input = LoadedInput::load(&settings.input)?;
    let heads = workflows::select_atoms(
        &input.system,
        input.groups.as_ref(),
        &settings.input.heads,
    )?;
    let mut trajectory = open_trajectory(trajectory_path)?;

    let legends = heads
        .iter()
        .filter_map(|&index| input.system.atom(index))
        .map(|atom| format!("index {}", atom.serial))
        .collect();
    let header = SeriesHeader {
        title: "Positions of lipid heads in time",
        y_label: format!("{}-coordinate [nm]", settings.analysis.axis),
        source: trajectory_path.display().to_string(),
        legends,
    };
    let mut writer = SeriesWriter::create(&settings.output, &header)?;
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    let frames = workflows::positions::run(
        &mut input.system,
        &mut trajectory,
        &heads,
        &settings.analysis,
        &reporter,
        |frame| {
            let values = frame.coordinates.iter().map(|c| format!("{:.3}", c));
            writer.write_row(frame.time_ps, values)
        },
    )?;
    writer.finish()?;

    println!(
        "Analyzed {} frames of {} heads. Output file {} written.",
        frames,
        heads.len(),
        settings.output.display()
    );
    Ok(())
}
