use super::{LoadedInput, open_trajectory, print_inputs};
use crate::config::FlipFlopSettings;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use scramblyzer::engine::flipflop::FlipFlopSummary;
use scramblyzer::engine::progress::ProgressReporter;
use scramblyzer::workflows;
use std::io::{self, Write};
use tracing::info;

pub fn run(settings: FlipFlopSettings, progress: &CliProgressHandler) -> Result<()> {
    print_inputs(
        "Flip-Flop Detection",
        &settings.input,
        Some(settings.trajectory.as_path()),
    );
    println!(">>> spatial limit:    {} nm", settings.analysis.spatial_limit);
    println!(">>> temporal limit:   {} frames", settings.analysis.temporal_limit);
    println!(">>> frame step:       {} ns", settings.analysis.frame_step_ns);

    let mut input = LoadedInput::load(&settings.input)?;
    let composition = input.resolve_lipids(&settings.input.heads)?;
    let mut trajectory = open_trajectory(&settings.trajectory)?;

    let mut events = match &settings.events {
        Some(path) => {
            let mut writer =
                csv::Writer::from_path(path).map_err(|e| CliError::Other(e.into()))?;
            writer
                .write_record(["lipid", "atom", "direction", "time_ns"])
                .map_err(io::Error::from)?;
            Some(writer)
        }
        None => None,
    };

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let summary = workflows::flipflops::run(
        &mut input.system,
        &mut trajectory,
        &composition,
        &settings.analysis,
        &reporter,
        |event| {
            if let Some(writer) = events.as_mut() {
                writer.write_record([
                    event.lipid_type.clone(),
                    event.atom_serial.to_string(),
                    event.direction.to_string(),
                    format!("{:.6}", event.time_ps / 1000.0),
                ])?;
            }
            Ok(())
        },
    )?;

    if let Some(mut writer) = events {
        writer.flush()?;
        if let Some(path) = &settings.events {
            info!("Flip-flop events written to {:?}", path);
        }
    }

    println!();
    write_table(&mut io::stdout().lock(), &summary)?;
    Ok(())
}

/// Prints flip-flop counts per lipid type with a `TOTAL` row for multiple types.
pub fn write_table(out: &mut impl Write, summary: &FlipFlopSummary) -> io::Result<()> {
    writeln!(out, "Lipid | U->L | L->U | All ")?;
    for (name, counts) in &summary.rows {
        writeln!(
            out,
            "{:<5} | {:<4} | {:<4} | {:<4}",
            name,
            counts.upper_to_lower,
            counts.lower_to_upper,
            counts.total()
        )?;
    }
    if let Some(total) = summary.aggregate() {
        writeln!(out, "{}", "-".repeat(29))?;
        writeln!(
            out,
            "TOTAL | {:<4} | {:<4} | {:<4}",
            total.upper_to_lower,
            total.lower_to_upper,
            total.total()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{HEADS_Z, write_inputs};
    use crate::config::InputSettings;
    use scramblyzer::core::utils::geometry::Axis;
    use scramblyzer::engine::config::FlipFlopConfigBuilder;
    use scramblyzer::engine::error::EngineError;
    use scramblyzer::engine::flipflop::FlipFlopCounts;
    use std::path::{Path, PathBuf};

    fn settings(structure: &Path, trajectory: &Path, events: Option<PathBuf>) -> FlipFlopSettings {
        FlipFlopSettings {
            input: InputSettings {
                structure: structure.to_path_buf(),
                index: None,
                lipids: None,
                heads: "name PO4".to_string(),
                axis: Axis::Z,
            },
            trajectory: trajectory.to_path_buf(),
            events,
            analysis: FlipFlopConfigBuilder::new()
                .spatial_limit(1.5)
                .temporal_limit(2)
                .build()
                .unwrap(),
        }
    }

    #[test]
    fn table_lists_directions_and_total() {
        let summary = FlipFlopSummary {
            rows: vec![
                (
                    "POPC".to_string(),
                    FlipFlopCounts {
                        upper_to_lower: 3,
                        lower_to_upper: 1,
                    },
                ),
                ("POPE".to_string(), FlipFlopCounts::default()),
            ],
            frames_analyzed: 10,
        };
        let mut out = Vec::new();
        write_table(&mut out, &summary).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Lipid | U->L | L->U | All \n\
             POPC  | 3    | 1    | 4   \n\
             POPE  | 0    | 0    | 0   \n\
             -----------------------------\n\
             TOTAL | 3    | 1    | 4   \n"
        );
    }

    #[test]
    fn detected_events_are_written_to_csv() {
        let dir = tempfile::tempdir().unwrap();
        let lower = [2.0, 3.0, 7.0, 8.0];
        let (structure, trajectory) = write_inputs(
            dir.path(),
            &[(0.0, HEADS_Z), (1000.0, lower), (2000.0, lower)],
        );
        let events = dir.path().join("events.csv");

        run(
            settings(&structure, &trajectory, Some(events.clone())),
            &CliProgressHandler::hidden(),
        )
        .unwrap();

        let content = std::fs::read_to_string(events).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["lipid,atom,direction,time_ns", "POPC,1,upper->lower,2.000000"]);
    }

    #[test]
    fn frame_gap_aborts_the_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, trajectory) =
            write_inputs(dir.path(), &[(0.0, HEADS_Z), (2000.0, HEADS_Z)]);

        let result = run(
            settings(&structure, &trajectory, None),
            &CliProgressHandler::hidden(),
        );
        assert!(matches!(
            result,
            Err(CliError::Core(EngineError::FrameGap { .. }))
        ));
    }
}
