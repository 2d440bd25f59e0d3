use super::config::FlipFlopConfig;
use super::error::EngineError;
use super::leaflet::{LeafletClassifier, Zone};
use crate::core::lipids::composition::LipidComposition;
use crate::core::models::system::MolecularSystem;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlipFlopDirection {
    UpperToLower,
    LowerToUpper,
}

impl fmt::Display for FlipFlopDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlipFlopDirection::UpperToLower => write!(f, "upper->lower"),
            FlipFlopDirection::LowerToUpper => write!(f, "lower->upper"),
        }
    }
}

/// Hysteresis state of a single head atom.
///
/// The streak counts consecutive analyzed frames since the head arrived in
/// its current leaflet. A streak above the temporal limit means the head is
/// settled in that leaflet; a streak of exactly the limit is reached once,
/// on the frame that confirms a flip-flop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafletState {
    #[default]
    Undetermined,
    Upper(u32),
    Lower(u32),
}

impl LeafletState {
    /// Signed counter view of the state: positive for upper, negative for lower.
    pub fn counter(self) -> i64 {
        match self {
            LeafletState::Undetermined => 0,
            LeafletState::Upper(streak) => i64::from(streak),
            LeafletState::Lower(streak) => -i64::from(streak),
        }
    }

    fn enter_upper(self, zone: Zone, limit: u32) -> Self {
        use LeafletState::*;
        match self {
            Undetermined | Upper(0) | Lower(0) => Upper(limit + 1),
            Upper(streak) if streak > limit => self,
            Upper(streak) => Upper(streak + 1),
            // Leaving a settled lower leaflet only counts from the upper core.
            Lower(streak) if streak >= limit => {
                if zone.is_core() {
                    Upper(1)
                } else {
                    self
                }
            }
            // An unconfirmed excursion to the lower side is discarded.
            Lower(_) => Upper(limit + 1),
        }
    }

    fn enter_lower(self, zone: Zone, limit: u32) -> Self {
        use LeafletState::*;
        match self {
            Undetermined | Upper(0) | Lower(0) => Lower(limit + 1),
            Lower(streak) if streak > limit => self,
            Lower(streak) => Lower(streak + 1),
            Upper(streak) if streak >= limit => {
                if zone.is_core() {
                    Lower(1)
                } else {
                    self
                }
            }
            Upper(_) => Lower(limit + 1),
        }
    }

    /// Updates the state with the head's distance from the membrane center in one frame.
    ///
    /// # Return
    ///
    /// Returns the direction of a flip-flop confirmed by this frame, if any.
    /// A head exactly at the center leaves the state unchanged. Temporal limits
    /// above [`FlipFlopConfig::MAX_TEMPORAL_LIMIT`] are treated as that maximum.
    pub fn observe(
        &mut self,
        distance: f64,
        spatial_limit: f64,
        temporal_limit: u32,
    ) -> Option<FlipFlopDirection> {
        let temporal_limit = temporal_limit.min(FlipFlopConfig::MAX_TEMPORAL_LIMIT);
        let zone = Zone::classify(distance, spatial_limit)?;
        *self = if zone.is_upper() {
            self.enter_upper(zone, temporal_limit)
        } else {
            self.enter_lower(zone, temporal_limit)
        };

        match *self {
            LeafletState::Upper(streak) if streak == temporal_limit && distance > 0.0 => {
                Some(FlipFlopDirection::LowerToUpper)
            }
            LeafletState::Lower(streak) if streak == temporal_limit && distance < 0.0 => {
                Some(FlipFlopDirection::UpperToLower)
            }
            _ => None,
        }
    }
}

/// A confirmed leaflet transition of one lipid.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipFlopEvent {
    pub lipid_type: String,
    /// Zero-based index of the head atom in the system.
    pub atom_index: usize,
    /// Atom number of the head atom as written in the structure file.
    pub atom_serial: usize,
    pub direction: FlipFlopDirection,
    /// Time of the confirming frame in picoseconds.
    pub time_ps: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlipFlopCounts {
    pub upper_to_lower: usize,
    pub lower_to_upper: usize,
}

impl FlipFlopCounts {
    pub fn total(&self) -> usize {
        self.upper_to_lower + self.lower_to_upper
    }

    fn record(&mut self, direction: FlipFlopDirection) {
        match direction {
            FlipFlopDirection::UpperToLower => self.upper_to_lower += 1,
            FlipFlopDirection::LowerToUpper => self.lower_to_upper += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlipFlopSummary {
    pub rows: Vec<(String, FlipFlopCounts)>,
    pub frames_analyzed: usize,
}

impl FlipFlopSummary {
    /// Counts summed over all lipid types, present only when there are at least two types.
    pub fn aggregate(&self) -> Option<FlipFlopCounts> {
        if self.rows.len() < 2 {
            return None;
        }
        Some(
            self.rows
                .iter()
                .fold(FlipFlopCounts::default(), |acc, (_, counts)| FlipFlopCounts {
                    upper_to_lower: acc.upper_to_lower + counts.upper_to_lower,
                    lower_to_upper: acc.lower_to_upper + counts.lower_to_upper,
                }),
        )
    }

    pub fn total(&self) -> usize {
        self.rows.iter().map(|(_, counts)| counts.total()).sum()
    }
}

/// Tracks the hysteresis state of every head atom across a trajectory.
///
/// States are created undetermined and are never reset. Analyzed frames must
/// come in strictly increasing time order with gaps no larger than the
/// configured frame step.
pub struct FlipFlopTracker<'a> {
    composition: &'a LipidComposition,
    spatial_limit: f64,
    temporal_limit: u32,
    max_gap_ps: f64,
    states: Vec<Vec<LeafletState>>,
    counts: Vec<FlipFlopCounts>,
    last_time_ps: Option<f64>,
    frames_analyzed: usize,
}

impl<'a> FlipFlopTracker<'a> {
    pub fn new(composition: &'a LipidComposition, config: &FlipFlopConfig) -> Self {
        let states = composition
            .lipid_types()
            .iter()
            .map(|lipid| vec![LeafletState::Undetermined; lipid.head_count()])
            .collect();
        Self {
            composition,
            spatial_limit: config.spatial_limit,
            temporal_limit: config.temporal_limit,
            max_gap_ps: config.max_gap_ps(),
            states,
            counts: vec![FlipFlopCounts::default(); composition.type_count()],
            last_time_ps: None,
            frames_analyzed: 0,
        }
    }

    fn check_time(&self, time_ps: f64) -> Result<(), EngineError> {
        let Some(previous_ps) = self.last_time_ps else {
            return Ok(());
        };
        if time_ps <= previous_ps {
            return Err(EngineError::NonMonotonicTime {
                previous_ps,
                current_ps: time_ps,
            });
        }
        if time_ps - previous_ps > self.max_gap_ps {
            return Err(EngineError::FrameGap {
                previous_ps,
                current_ps: time_ps,
                max_gap_ps: self.max_gap_ps,
            });
        }
        Ok(())
    }

    fn check_heads(&self, system: &MolecularSystem) -> Result<(), EngineError> {
        let atom_count = system.atom_count();
        match self
            .composition
            .lipid_types()
            .iter()
            .flat_map(|lipid| lipid.heads.iter().copied())
            .find(|&index| index >= atom_count)
        {
            Some(index) => Err(EngineError::AtomIndexOutOfRange { index, atom_count }),
            None => Ok(()),
        }
    }

    /// Updates every head atom with the current frame of `system`.
    ///
    /// # Return
    ///
    /// Returns the flip-flops confirmed in this frame.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NonMonotonicTime`] or [`EngineError::FrameGap`] if the
    /// frame time is inconsistent with the previous analyzed frame, and
    /// [`EngineError::AtomIndexOutOfRange`] if a head atom does not exist in
    /// `system`. The tracker is left unchanged in these cases.
    pub fn process_frame(
        &mut self,
        system: &MolecularSystem,
        classifier: &LeafletClassifier,
    ) -> Result<Vec<FlipFlopEvent>, EngineError> {
        let time_ps = system.time();
        self.check_heads(system)?;
        self.check_time(time_ps)?;
        self.last_time_ps = Some(time_ps);
        self.frames_analyzed += 1;

        let mut events = Vec::new();
        let lipid_types = self.composition.lipid_types();
        for ((lipid, states), counts) in lipid_types
            .iter()
            .zip(self.states.iter_mut())
            .zip(self.counts.iter_mut())
        {
            for (&atom_index, state) in lipid.heads.iter().zip(states.iter_mut()) {
                let atom = &system.atoms()[atom_index];
                let distance = classifier.distance(&atom.position);
                if let Some(direction) =
                    state.observe(distance, self.spatial_limit, self.temporal_limit)
                {
                    counts.record(direction);
                    debug!(
                        lipid = %lipid.name,
                        atom = atom.serial,
                        %direction,
                        time_ps,
                        "Detected flip-flop."
                    );
                    events.push(FlipFlopEvent {
                        lipid_type: lipid.name.clone(),
                        atom_index,
                        atom_serial: atom.serial,
                        direction,
                        time_ps,
                    });
                }
            }
        }

        Ok(events)
    }

    /// Current states of the heads of the lipid type at `type_index`.
    pub fn states(&self, type_index: usize) -> Option<&[LeafletState]> {
        self.states.get(type_index).map(Vec::as_slice)
    }

    pub fn frames_analyzed(&self) -> usize {
        self.frames_analyzed
    }

    pub fn summary(&self) -> FlipFlopSummary {
        FlipFlopSummary {
            rows: self
                .composition
                .lipid_types()
                .iter()
                .zip(&self.counts)
                .map(|(lipid, counts)| (lipid.name.clone(), *counts))
                .collect(),
            frames_analyzed: self.frames_analyzed,
        }
    }
}
