use crate::core::lipids::composition::LipidComposition;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::geometry::{Axis, periodic_distance};
use nalgebra::Point3;
use std::fmt;

/// Binary leaflet assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Upper,
    Lower,
}

impl Side {
    /// `d > 0` is the upper leaflet; everything else, including `d == 0`, is lower.
    #[inline]
    pub fn from_distance(distance: f64) -> Self {
        if distance > 0.0 { Side::Upper } else { Side::Lower }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Upper => write!(f, "upper"),
            Side::Lower => write!(f, "lower"),
        }
    }
}

/// Position of a head atom relative to the membrane center and the spatial limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    UpperCore,
    UpperIntermediate,
    LowerIntermediate,
    LowerCore,
}

impl Zone {
    /// Classifies a signed distance from the membrane center.
    ///
    /// Returns `None` for a head exactly at the center (or a NaN distance).
    #[inline]
    pub fn classify(distance: f64, spatial_limit: f64) -> Option<Self> {
        if distance > spatial_limit {
            Some(Zone::UpperCore)
        } else if distance > 0.0 {
            Some(Zone::UpperIntermediate)
        } else if distance < -spatial_limit {
            Some(Zone::LowerCore)
        } else if distance < 0.0 {
            Some(Zone::LowerIntermediate)
        } else {
            None
        }
    }

    pub fn is_upper(self) -> bool {
        matches!(self, Zone::UpperCore | Zone::UpperIntermediate)
    }

    pub fn is_core(self) -> bool {
        matches!(self, Zone::UpperCore | Zone::LowerCore)
    }
}

/// Classifies atoms of one frame relative to the membrane center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafletClassifier {
    axis: Axis,
    center: f64,
    box_length: f64,
}

impl LeafletClassifier {
    pub fn new(axis: Axis, center: f64, box_length: f64) -> Self {
        Self {
            axis,
            center,
            box_length,
        }
    }

    /// Creates a classifier using the box of the current frame of `system`.
    pub fn for_frame(system: &MolecularSystem, axis: Axis, center: f64) -> Self {
        Self::new(axis, center, system.simbox().length(axis))
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    /// Signed minimum-image distance of `position` from the membrane center.
    #[inline]
    pub fn distance(&self, position: &Point3<f64>) -> f64 {
        periodic_distance(self.axis.component(position), self.center, self.box_length)
    }

    #[inline]
    pub fn side(&self, position: &Point3<f64>) -> Side {
        Side::from_distance(self.distance(position))
    }

    #[inline]
    pub fn zone(&self, position: &Point3<f64>, spatial_limit: f64) -> Option<Zone> {
        Zone::classify(self.distance(position), spatial_limit)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeafletCounts {
    pub upper: usize,
    pub lower: usize,
}

impl LeafletCounts {
    pub fn total(&self) -> usize {
        self.upper + self.lower
    }

    fn add(&mut self, side: Side) {
        match side {
            Side::Upper => self.upper += 1,
            Side::Lower => self.lower += 1,
        }
    }
}

impl std::ops::Add for LeafletCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            upper: self.upper + rhs.upper,
            lower: self.lower + rhs.lower,
        }
    }
}

/// Number of head atoms per leaflet for every lipid type in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafletComposition {
    /// Frame time in picoseconds.
    pub time_ps: f64,
    pub rows: Vec<(String, LeafletCounts)>,
}

impl LeafletComposition {
    pub fn count(
        system: &MolecularSystem,
        composition: &LipidComposition,
        classifier: &LeafletClassifier,
    ) -> Self {
        let rows = composition
            .lipid_types()
            .iter()
            .map(|lipid| {
                let mut counts = LeafletCounts::default();
                for position in system.positions_of(&lipid.heads) {
                    counts.add(classifier.side(position));
                }
                (lipid.name.clone(), counts)
            })
            .collect();

        Self {
            time_ps: system.time(),
            rows,
        }
    }

    /// Counts summed over all lipid types, present only when there are at least two types.
    pub fn aggregate(&self) -> Option<LeafletCounts> {
        if self.rows.len() < 2 {
            return None;
        }
        Some(
            self.rows
                .iter()
                .fold(LeafletCounts::default(), |acc, (_, counts)| acc + *counts),
        )
    }
}
