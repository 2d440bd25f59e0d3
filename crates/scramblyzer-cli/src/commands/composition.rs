use super::{LoadedInput, open_trajectory, print_inputs};
use crate::config::StepSettings;
use crate::error::Result;
use crate::output::{SeriesHeader, SeriesWriter};
use crate::utils::progress::CliProgressHandler;
use scramblyzer::core::lipids::composition::LipidComposition;
use scramblyzer::engine::leaflet::{LeafletComposition, LeafletCounts};
use scramblyzer::engine::progress::ProgressReporter;
use scramblyzer::workflows;
use std::io::{self, Write};
use tracing::info;

const TOTAL: &str = "TOTAL";

pub fn run(settings: StepSettings, progress: &CliProgressHandler) -> Result<()> {
    print_inputs(
        "Leaflet Composition",
        &settings.input,
        settings.trajectory.as_deref(),
    );
    let mut input = LoadedInput::load(&settings.input)?;
    let composition = input.resolve_lipids(&settings.input.heads)?;

    let Some(path) = &settings.trajectory else {
        info!("No trajectory supplied, analyzing the structure only.");
        let counts =
            workflows::composition::snapshot(&input.system, &composition, settings.analysis.axis)?;
        write_table(&mut io::stdout().lock(), &counts)?;
        return Ok(());
    };

    let mut trajectory = open_trajectory(path)?;
    let header = SeriesHeader {
        title: "Membrane composition in time",
        y_label: "number of lipids".to_string(),
        source: path.display().to_string(),
        legends: legends(&composition),
    };
    let mut writer = SeriesWriter::create(&settings.output, &header)?;
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    let frames = workflows::composition::run(
        &mut input.system,
        &mut trajectory,
        &composition,
        &settings.analysis,
        &reporter,
        |counts| writer.write_row(counts.time_ps, row_values(counts)),
    )?;
    writer.finish()?;

    println!(
        "Analyzed {} frames. Output file {} written.",
        frames,
        settings.output.display()
    );
    Ok(())
}

fn legends(composition: &LipidComposition) -> Vec<String> {
    let mut names: Vec<&str> = composition
        .lipid_types()
        .iter()
        .map(|lipid| lipid.name.as_str())
        .collect();
    if composition.has_aggregate() {
        names.push(TOTAL);
    }
    names
        .into_iter()
        .flat_map(|name| {
            [
                format!("{}_upper", name),
                format!("{}_lower", name),
                format!("{}_full", name),
            ]
        })
        .collect()
}

fn row_values(counts: &LeafletComposition) -> Vec<usize> {
    counts
        .rows
        .iter()
        .map(|(_, c)| *c)
        .chain(counts.aggregate())
        .flat_map(|c: LeafletCounts| [c.upper, c.lower, c.total()])
        .collect()
}

/// Prints per-type leaflet counts with a `TOTAL` row for multiple types.
pub fn write_table(out: &mut impl Write, counts: &LeafletComposition) -> io::Result<()> {
    writeln!(out, "Lipid | Upper | Lower | Full ")?;
    for (name, c) in &counts.rows {
        writeln!(
            out,
            "{:<5} | {:<5} | {:<5} | {:<5}",
            name,
            c.upper,
            c.lower,
            c.total()
        )?;
    }
    if let Some(total) = counts.aggregate() {
        writeln!(out, "{}", "-".repeat(29))?;
        writeln!(
            out,
            "{:<5} | {:<5} | {:<5} | {:<5}",
            TOTAL,
            total.upper,
            total.lower,
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
    use scramblyzer::engine::config::AnalysisConfigBuilder;
    use std::path::{Path, PathBuf};

    fn settings(structure: &Path, trajectory: Option<PathBuf>, output: PathBuf) -> StepSettings {
        StepSettings {
            input: InputSettings {
                structure: structure.to_path_buf(),
                index: None,
                lipids: None,
                heads: "name PO4".to_string(),
                axis: Axis::Z,
            },
            trajectory,
            output,
            analysis: AnalysisConfigBuilder::new().time_step_ns(1.0).build().unwrap(),
        }
    }

    #[test]
    fn table_lists_types_and_total() {
        let counts = LeafletComposition {
            time_ps: 0.0,
            rows: vec![
                ("POPC".to_string(), LeafletCounts { upper: 10, lower: 8 }),
                ("POPE".to_string(), LeafletCounts { upper: 2, lower: 3 }),
            ],
        };
        let mut out = Vec::new();
        write_table(&mut out, &counts).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Lipid | Upper | Lower | Full \n\
             POPC  | 10    | 8     | 18   \n\
             POPE  | 2     | 3     | 5    \n\
             -----------------------------\n\
             TOTAL | 12    | 11    | 23   \n"
        );
    }

    #[test]
    fn table_for_single_type_has_no_total() {
        let counts = LeafletComposition {
            time_ps: 0.0,
            rows: vec![("POPC".to_string(), LeafletCounts { upper: 1, lower: 1 })],
        };
        let mut out = Vec::new();
        write_table(&mut out, &counts).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("TOTAL"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn trajectory_run_writes_one_row_per_analyzed_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, trajectory) = write_inputs(
            dir.path(),
            &[(0.0, HEADS_Z), (500.0, HEADS_Z), (1000.0, HEADS_Z)],
        );
        let output = dir.path().join("composition.xvg");

        run(
            settings(&structure, Some(trajectory), output.clone()),
            &CliProgressHandler::hidden(),
        )
        .unwrap();

        let content = std::fs::read_to_string(output).unwrap();
        assert!(content.contains("@    s0 legend \"POPC_upper\""));
        assert!(content.contains("@    s8 legend \"TOTAL_full\""));
        let rows: Vec<&str> = content
            .lines()
            .filter(|line| !line.starts_with(['#', '@']))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("0.000000"));
        assert!(rows[1].starts_with("1.000000"));
        let values: Vec<&str> = rows[0].split_whitespace().skip(1).collect();
        assert_eq!(values, ["1", "1", "2", "1", "0", "1", "2", "1", "3"]);
    }

    #[test]
    fn structure_only_run_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let (structure, _) = write_inputs(dir.path(), &[]);
        let output = dir.path().join("composition.xvg");

        run(
            settings(&structure, None, output.clone()),
            &CliProgressHandler::hidden(),
        )
        .unwrap();
        assert!(!output.exists());
    }
}
