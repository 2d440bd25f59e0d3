use super::for_each_frame;
use crate::core::io::traits::TrajectoryReader;
use crate::core::models::system::MolecularSystem;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::io;
use tracing::{info, instrument};

/// Coordinates of the selected head atoms along the membrane normal in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionsFrame {
    pub time_ps: f64,
    /// In the order of the head indices passed to [`run`], in nm.
    pub coordinates: Vec<f64>,
}

/// Records the coordinate of every head atom for every analyzed frame.
///
/// Coordinates are raw box coordinates; no membrane center is subtracted.
///
/// # Errors
///
/// Returns [`EngineError::EmptySelection`] if `heads` is empty.
#[instrument(skip_all, name = "positions_workflow")]
pub fn run<T, S>(
    system: &mut MolecularSystem,
    trajectory: &mut T,
    heads: &[usize],
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
    mut sink: S,
) -> Result<usize, EngineError>
where
    T: TrajectoryReader,
    S: FnMut(&PositionsFrame) -> io::Result<()>,
{
    if heads.is_empty() {
        return Err(EngineError::EmptySelection("lipid heads".to_string()));
    }

    reporter.report(Progress::PhaseStart {
        name: "Head Positions",
    });
    info!(
        heads = heads.len(),
        time_step_ns = config.time_step_ns,
        axis = %config.axis,
        "Recording head positions."
    );

    let analyzed = for_each_frame(
        system,
        trajectory,
        config.frame_selector(),
        reporter,
        |frame| {
            let positions = PositionsFrame {
                time_ps: frame.time(),
                coordinates: frame
                    .positions_of(heads)
                    .map(|position| config.axis.component(position))
                    .collect(),
            };
            sink(&positions)?;
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
    use crate::workflows::testing::{VecTrajectory, membrane};

    #[test]
    fn run_records_head_coordinates_per_frame() {
        let (mut system, _) = membrane();
        let mut trajectory = VecTrajectory::new(vec![
            (0.0, vec![7.0, 3.0, 7.0, 3.0]),
            (1000.0, vec![6.5, 3.5, 7.25, 3.0]),
        ]);
        let config = AnalysisConfigBuilder::new().time_step_ns(1.0).build().unwrap();

        let mut frames = Vec::new();
        let analyzed = run(
            &mut system,
            &mut trajectory,
            &[0, 1, 2],
            &config,
            &ProgressReporter::new(),
            |frame| {
                frames.push(frame.clone());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(analyzed, 2);
        assert_eq!(
            frames[1],
            PositionsFrame {
                time_ps: 1000.0,
                coordinates: vec![6.5, 3.5, 7.25],
            }
        );
    }

    #[test]
    fn run_requires_head_atoms() {
        let (mut system, _) = membrane();
        let mut trajectory = VecTrajectory::new(Vec::new());
        let config = AnalysisConfigBuilder::new().time_step_ns(1.0).build().unwrap();
        let result = run(
            &mut system,
            &mut trajectory,
            &[],
            &config,
            &ProgressReporter::new(),
            |_| Ok(()),
        );
        assert!(matches!(result, Err(EngineError::EmptySelection(_))));
    }
}
