use super::frames::FrameSelector;
use crate::core::utils::geometry::Axis;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Shortest time step (in ns) that still rounds to one picosecond.
const MIN_TIME_STEP_NS: f64 = 0.0005;

fn validate_time_step(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() || value < MIN_TIME_STEP_NS {
        return Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a positive time that rounds to at least 1 ps, got {} ns", value),
        });
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Membrane normal.
    pub axis: Axis,
    /// Time between analyzed frames in nanoseconds.
    pub time_step_ns: f64,
}

impl AnalysisConfig {
    pub fn frame_selector(&self) -> FrameSelector {
        FrameSelector::from_step_ns(self.time_step_ns)
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    axis: Option<Axis>,
    time_step_ns: Option<f64>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }
    pub fn time_step_ns(mut self, step: f64) -> Self {
        self.time_step_ns = Some(step);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let time_step_ns = self
            .time_step_ns
            .ok_or(ConfigError::MissingParameter("time_step_ns"))?;
        Ok(AnalysisConfig {
            axis: self.axis.unwrap_or_default(),
            time_step_ns: validate_time_step("time_step_ns", time_step_ns)?,
        })
    }
}

/// Parameters of the flip-flop hysteresis.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipFlopConfig {
    pub axis: Axis,
    /// Distance from the membrane center (nm) beyond which a head is in a leaflet core.
    pub spatial_limit: f64,
    /// Number of consecutive analyzed frames needed to confirm a leaflet change.
    pub temporal_limit: u32,
    /// Time between analyzed frames in nanoseconds; also the largest gap tolerated.
    pub frame_step_ns: f64,
}

impl FlipFlopConfig {
    /// Largest temporal limit the per-head streak counter can represent.
    pub const MAX_TEMPORAL_LIMIT: u32 = u32::MAX - 1;

    pub fn frame_selector(&self) -> FrameSelector {
        FrameSelector::from_step_ns(self.frame_step_ns)
    }

    /// Largest allowed time difference between consecutive analyzed frames in ps.
    pub fn max_gap_ps(&self) -> f64 {
        self.frame_selector().step_ps() as f64
    }
}

#[derive(Default)]
pub struct FlipFlopConfigBuilder {
    axis: Option<Axis>,
    spatial_limit: Option<f64>,
    temporal_limit: Option<u32>,
    frame_step_ns: Option<f64>,
}

impl FlipFlopConfigBuilder {
    pub const DEFAULT_FRAME_STEP_NS: f64 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }
    pub fn spatial_limit(mut self, limit: f64) -> Self {
        self.spatial_limit = Some(limit);
        self
    }
    pub fn temporal_limit(mut self, frames: u32) -> Self {
        self.temporal_limit = Some(frames);
        self
    }
    pub fn frame_step_ns(mut self, step: f64) -> Self {
        self.frame_step_ns = Some(step);
        self
    }

    pub fn build(self) -> Result<FlipFlopConfig, ConfigError> {
        let spatial_limit = self
            .spatial_limit
            .ok_or(ConfigError::MissingParameter("spatial_limit"))?;
        if !spatial_limit.is_finite() || spatial_limit <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "spatial_limit",
                reason: format!("must be a positive distance, got {}", spatial_limit),
            });
        }

        let temporal_limit = self
            .temporal_limit
            .ok_or(ConfigError::MissingParameter("temporal_limit"))?;
        if !(1..=FlipFlopConfig::MAX_TEMPORAL_LIMIT).contains(&temporal_limit) {
            return Err(ConfigError::InvalidParameter {
                name: "temporal_limit",
                reason: format!(
                    "must be between 1 and {} frames, got {}",
                    FlipFlopConfig::MAX_TEMPORAL_LIMIT,
                    temporal_limit
                ),
            });
        }

        let frame_step_ns = validate_time_step(
            "frame_step_ns",
            self.frame_step_ns.unwrap_or(Self::DEFAULT_FRAME_STEP_NS),
        )?;

        Ok(FlipFlopConfig {
            axis: self.axis.unwrap_or_default(),
            spatial_limit,
            temporal_limit,
            frame_step_ns,
        })
    }
}
