use super::for_each_frame;
use crate::core::io::traits::TrajectoryReader;
use crate::core::lipids::composition::LipidComposition;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::Axis;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::leaflet::{LeafletClassifier, LeafletComposition};
use crate::engine::membrane::MembraneCenterEstimator;
use crate::engine::progress::{Progress, ProgressReporter};
use std::io;
use tracing::{info, instrument};

/// Counts heads per leaflet in the current frame of `system`.
pub fn snapshot(
    system: &MolecularSystem,
    composition: &LipidComposition,
    axis: Axis,
) -> Result<LeafletComposition, EngineError> {
    let center = MembraneCenterEstimator::from_composition(composition, axis).estimate(system)?;
    let classifier = LeafletClassifier::for_frame(system, axis, center);
    Ok(LeafletComposition::count(system, composition, &classifier))
}

/// Counts heads per leaflet in every analyzed frame of a trajectory.
///
/// # Return
///
/// Returns the number of analyzed frames.
#[instrument(skip_all, name = "composition_workflow")]
pub fn run<T, S>(
    system: &mut MolecularSystem,
    trajectory: &mut T,
    composition: &LipidComposition,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
    mut sink: S,
) -> Result<usize, EngineError>
where
    T: TrajectoryReader,
    S: FnMut(&LeafletComposition) -> io::Result<()>,
{
    reporter.report(Progress::PhaseStart {
        name: "Leaflet Composition",
    });
    info!(
        time_step_ns = config.time_step_ns,
        axis = %config.axis,
        "Analyzing leaflet composition."
    );

    let analyzed = for_each_frame(
        system,
        trajectory,
        config.frame_selector(),
        reporter,
        |frame| {
            let counts = snapshot(frame, composition, config.axis)?;
            sink(&counts)?;
            Ok(())
        },
    )?;

    reporter.report(Progress::PhaseFinish);
    Ok(analyzed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::AnalysisConfigBuilder;
    use crate::engine::leaflet::LeafletCounts;
    use crate::workflows::testing::{VecTrajectory, membrane};

    #[test]
    fn snapshot_counts_heads_relative_to_center() {
        let (system, composition) = membrane();
        let counts = snapshot(&system, &composition, Axis::Z).unwrap();
        assert_eq!(
            counts.rows,
            vec![
                ("POPC".to_string(), LeafletCounts { upper: 1, lower: 1 }),
                ("POPE".to_string(), LeafletCounts { upper: 1, lower: 0 }),
            ]
        );
        assert_eq!(counts.aggregate(), Some(LeafletCounts { upper: 2, lower: 1 }));
    }

    #[test]
    fn run_emits_one_row_per_selected_frame() {
        let (mut system, composition) = membrane();
        let mut trajectory = VecTrajectory::new(vec![
            (0.0, vec![7.0, 3.0, 7.0, 3.0]),
            (500.0, vec![7.0, 3.0, 7.0, 3.0]),
            (1000.0, vec![3.0, 3.0, 7.0, 3.0]),
        ]);
        let config = AnalysisConfigBuilder::new().time_step_ns(1.0).build().unwrap();

        let mut rows = Vec::new();
        let analyzed = run(
            &mut system,
            &mut trajectory,
            &composition,
            &config,
            &ProgressReporter::new(),
            |frame| {
                rows.push(frame.clone());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(analyzed, 2);
        assert_eq!(rows[0].time_ps, 0.0);
        assert_eq!(rows[1].time_ps, 1000.0);
        // Center at 4.0: only the POPE head stays above it.
        assert_eq!(rows[1].rows[0].1, LeafletCounts { upper: 0, lower: 2 });
        assert_eq!(rows[1].rows[1].1, LeafletCounts { upper: 1, lower: 0 });
    }

    #[test]
    fn run_propagates_sink_failures() {
        let (mut system, composition) = membrane();
        let mut trajectory = VecTrajectory::new(vec![(0.0, vec![7.0, 3.0, 7.0, 3.0])]);
        let config = AnalysisConfigBuilder::new().time_step_ns(1.0).build().unwrap();

        let result = run(
            &mut system,
            &mut trajectory,
            &composition,
            &config,
            &ProgressReporter::new(),
            |_| Err(io::Error::other("disk full")),
        );
        assert!(matches!(result, Err(EngineError::Output(_))));
    }
}
