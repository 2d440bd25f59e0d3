use super::{LoadedInput, open_trajectory, print_inputs};
use crate::config::StepSettings;
use crate::error::{CliError, Result};
use crate::output::{SeriesHeader, SeriesWriter};
use crate::utils::progress::CliProgressHandler;
use scramblyzer::engine::progress::ProgressReporter;
use scramblyzer::engine::scrambling::ScramblingFrame;
use scramblyzer::workflows;
use tracing::info;

pub fn run(settings: StepSettings, progress: &CliProgressHandler) -> Result<()> {
    let trajectory_path = settings
        .trajectory
        .as_deref()
        .ok_or_else(|| CliError::Argument("The rate analysis requires a trajectory.".to_string()))?;
    print_inputs("Scrambling Rate", &settings.input, Some(trajectory_path));

    let mut input = LoadedInput::load(&settings.input)?;
    let composition = input.resolve_lipids(&settings.input.heads)?;
    let mut trajectory = open_trajectory(trajectory_path)?;

    let mut legends: Vec<String> = composition
        .lipid_types()
        .iter()
        .map(|lipid| lipid.name.clone())
        .collect();
    if composition.has_aggregate() {
        legends.push("TOTAL".to_string());
    }
    let header = SeriesHeader {
        title: "Percentage of scrambled lipids in time",
        y_label: "scrambled lipids [%]".to_string(),
        source: trajectory_path.display().to_string(),
        legends,
    };
    let mut writer = SeriesWriter::create(&settings.output, &header)?;
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    let mut last: Option<ScramblingFrame> = None;
    let frames = workflows::rate::run(
        &mut input.system,
        &mut trajectory,
        &composition,
        &settings.analysis,
        &reporter,
        |frame| {
            let values = frame
                .rows
                .iter()
                .map(|(_, rate)| *rate)
                .chain(frame.aggregate)
                .map(|rate| format!("{:.6}", rate));
            writer.write_row(frame.time_ps, values)?;
            last = Some(frame.clone());
            Ok(())
        },
    )?;
    writer.finish()?;

    if let Some(frame) = last {
        info!(
            time_ps = frame.time_ps,
            "Final scrambling: {}",
            frame
                .rows
                .iter()
                .map(|(name, rate)| format!("{} {:.2} %", name, rate))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!(
        "Analyzed {} frames. Output file {} written.",
        frames,
        settings.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{HEADS_Z, write_inputs};
    use crate::config::InputSettings;
    use scramblyzer::core::utils::geometry::Axis;
    use scramblyzer::engine::config::AnalysisConfigBuilder;
    use std::path::Path;

    fn settings(structure: &Path, trajectory: &Path, output: &Path) -> StepSettings {
        StepSettings {
            input: InputSettings {
                structure: structure.to_path_buf(),
                index: None,
                lipids: None,
                heads: "name PO4".to_string(),
                axis: Axis::Z,
            },
            trajectory: Some(trajectory.to_path_buf()),
            output: output.to_path_buf(),
            analysis: AnalysisConfigBuilder::new().time_step_ns(1.0).build().unwrap(),
        }
    }

    #[test]
    fn rate_is_written_relative_to_first_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, trajectory) = write_inputs(
            dir.path(),
            &[(0.0, HEADS_Z), (1000.0, [3.0, 3.0, 7.0, 7.0])],
        );
        let output = dir.path().join("rate.csv");

        run(
            settings(&structure, &trajectory, &output),
            &CliProgressHandler::hidden(),
        )
        .unwrap();

        let content = std::fs::read_to_string(output).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "time_ns,POPC,POPE,TOTAL");
        assert_eq!(lines[1], "0.000000,0.000000,0.000000,0.000000");
        assert_eq!(lines[2], "1.000000,50.000000,0.000000,33.333333");
    }

    #[test]
    fn missing_trajectory_is_an_argument_error() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, trajectory) = write_inputs(dir.path(), &[]);
        let mut settings = settings(&structure, &trajectory, &dir.path().join("rate.xvg"));
        settings.trajectory = None;
        assert!(matches!(
            run(settings, &CliProgressHandler::hidden()),
            Err(CliError::Argument(_))
        ));
    }
}
