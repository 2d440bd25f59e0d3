/// Decides which trajectory frames are analyzed.
///
/// A frame is accepted when its simulation time, truncated to whole
/// picoseconds, is a multiple of the step. The step is given in nanoseconds
/// and rounded to whole picoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSelector {
    step_ps: i64,
}

impl FrameSelector {
    pub fn from_step_ns(step_ns: f64) -> Self {
        let step_ps = (step_ns * 1000.0).round() as i64;
        Self {
            step_ps: step_ps.max(1),
        }
    }

    pub fn step_ps(&self) -> i64 {
        self.step_ps
    }

    pub fn accepts(&self, time_ps: f64) -> bool {
        (time_ps as i64) % self.step_ps == 0
    }
}
