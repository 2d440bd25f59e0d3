use super::for_each_frame;
use crate::core::io::traits::TrajectoryReader;
use crate::core::lipids::composition::LipidComposition;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::FlipFlopConfig;
use crate::engine::error::EngineError;
use crate::engine::flipflop::{FlipFlopEvent, FlipFlopSummary, FlipFlopTracker};
use crate::engine::leaflet::LeafletClassifier;
use crate::engine::membrane::MembraneCenterEstimator;
use crate::engine::progress::{Progress, ProgressReporter};
use std::io;
use tracing::{info, instrument};

/// Detects flip-flops over a whole trajectory.
///
/// Every confirmed flip-flop is handed to `sink` in the frame that confirms
/// it. Frames are analyzed at the configured frame step; the trajectory must
/// provide a frame at every step.
///
/// # Errors
///
/// Returns [`EngineError::FrameGap`] if consecutive analyzed frames are further
/// apart than the frame step and [`EngineError::NonMonotonicTime`] if time
/// does not increase.
#[instrument(skip_all, name = "flipflops_workflow")]
pub fn run<T, S>(
    system: &mut MolecularSystem,
    trajectory: &mut T,
    composition: &LipidComposition,
    config: &FlipFlopConfig,
    reporter: &ProgressReporter,
    mut sink: S,
) -> Result<FlipFlopSummary, EngineError>
where
    T: TrajectoryReader,
    S: FnMut(&FlipFlopEvent) -> io::Result<()>,
{
    reporter.report(Progress::PhaseStart {
        name: "Flip-Flop Detection",
    });
    info!(
        spatial_limit = config.spatial_limit,
        temporal_limit = config.temporal_limit,
        frame_step_ns = config.frame_step_ns,
        axis = %config.axis,
        "Searching for flip-flops."
    );

    let estimator = MembraneCenterEstimator::from_composition(composition, config.axis);
    let mut tracker = FlipFlopTracker::new(composition, config);

    for_each_frame(
        system,
        trajectory,
        config.frame_selector(),
        reporter,
        |frame| {
            let center = estimator.estimate(frame)?;
            let classifier = LeafletClassifier::for_frame(frame, config.axis, center);
            for event in tracker.process_frame(frame, &classifier)? {
                sink(&event)?;
            }
            Ok(())
        },
    )?;

    let summary = tracker.summary();
    info!(
        flipflops = summary.total(),
        frames = summary.frames_analyzed,
        "Flip-flop detection complete."
    );
    reporter.report(Progress::PhaseFinish);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::FlipFlopConfigBuilder;
    use crate::engine::flipflop::FlipFlopDirection;
    use crate::workflows::testing::{VecTrajectory, membrane};

    fn config() -> FlipFlopConfig {
        FlipFlopConfigBuilder::new()
            .spatial_limit(1.5)
            .temporal_limit(2)
            .build()
            .unwrap()
    }

    #[test]
    fn run_streams_events_and_returns_summary() {
        let (mut system, composition) = membrane();
        // Head 1 (POPC) enters the upper core at 1 ns and is confirmed at 2 ns.
        let mut trajectory = VecTrajectory::new(vec![
            (0.0, vec![7.0, 3.0, 7.0, 3.0]),
            (500.0, vec![7.0, 9.0, 7.0, 3.0]),
            (1000.0, vec![7.0, 9.0, 7.0, 3.0]),
            (2000.0, vec![7.0, 9.0, 7.0, 3.0]),
            (3000.0, vec![7.0, 9.0, 7.0, 3.0]),
        ]);

        let mut events = Vec::new();
        let summary = run(
            &mut system,
            &mut trajectory,
            &composition,
            &config(),
            &ProgressReporter::new(),
            |event| {
                events.push(event.clone());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].atom_serial, 2);
        assert_eq!(events[0].direction, FlipFlopDirection::LowerToUpper);
        assert_eq!(events[0].time_ps, 2000.0);

        assert_eq!(summary.frames_analyzed, 4);
        assert_eq!(summary.rows[0].1.lower_to_upper, 1);
        assert_eq!(summary.rows[0].1.upper_to_lower, 0);
        assert_eq!(summary.aggregate().map(|c| c.total()), Some(1));
    }

    #[test]
    fn run_fails_on_missing_frames() {
        let (mut system, composition) = membrane();
        let mut trajectory = VecTrajectory::new(vec![
            (0.0, vec![7.0, 3.0, 7.0, 3.0]),
            (1000.0, vec![7.0, 3.0, 7.0, 3.0]),
            (3000.0, vec![7.0, 3.0, 7.0, 3.0]),
        ]);

        let result = run(
            &mut system,
            &mut trajectory,
            &composition,
            &config(),
            &ProgressReporter::new(),
            |_| Ok(()),
        );
        assert!(matches!(result, Err(EngineError::FrameGap { .. })));
    }
}
