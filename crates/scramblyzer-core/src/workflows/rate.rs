use super::for_each_frame;
use crate::core::io::traits::TrajectoryReader;
use crate::core::lipids::composition::LipidComposition;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::leaflet::LeafletClassifier;
use crate::engine::membrane::MembraneCenterEstimator;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scrambling::{ScramblingFrame, ScramblingRateTracker};
use std::io;
use tracing::{info, instrument};

/// Computes the scrambling rate for every analyzed frame of a trajectory.
///
/// The first analyzed frame is the reference and always reports 0 %.
///
/// # Return
///
/// Returns the number of analyzed frames.
#[instrument(skip_all, name = "rate_workflow")]
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
    S: FnMut(&ScramblingFrame) -> io::Result<()>,
{
    reporter.report(Progress::PhaseStart {
        name: "Scrambling Rate",
    });
    info!(
        time_step_ns = config.time_step_ns,
        axis = %config.axis,
        "Analyzing scrambling rate."
    );

    let estimator = MembraneCenterEstimator::from_composition(composition, config.axis);
    let mut tracker = ScramblingRateTracker::new(composition);

    let analyzed = for_each_frame(
        system,
        trajectory,
        config.frame_selector(),
        reporter,
        |frame| {
            let center = estimator.estimate(frame)?;
            let classifier = LeafletClassifier::for_frame(frame, config.axis, center);
            let rates = tracker.process_frame(frame, &classifier);
            sink(&rates)?;
            Ok(())
        },
    )?;

    reporter.report(Progress::PhaseFinish);
    Ok(analyzed)
}
