use super::leaflet::{LeafletClassifier, Side};
use crate::core::lipids::composition::LipidComposition;
use crate::core::models::system::MolecularSystem;

/// Percentage of heads found in the leaflet opposite to their reference leaflet.
#[derive(Debug, Clone, PartialEq)]
pub struct ScramblingFrame {
    /// Frame time in picoseconds.
    pub time_ps: f64,
    /// Per lipid type, in composition order.
    pub rows: Vec<(String, f64)>,
    /// Over all heads; present only when there are at least two lipid types.
    pub aggregate: Option<f64>,
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        100.0 * part as f64 / whole as f64
    }
}

/// Measures how far a membrane has scrambled relative to its first analyzed frame.
///
/// The leaflet of every head atom in the first frame is stored as its
/// reference and never changes afterwards.
pub struct ScramblingRateTracker<'a> {
    composition: &'a LipidComposition,
    reference: Option<Vec<Vec<Side>>>,
}

impl<'a> ScramblingRateTracker<'a> {
    pub fn new(composition: &'a LipidComposition) -> Self {
        Self {
            composition,
            reference: None,
        }
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    fn sides(&self, system: &MolecularSystem, classifier: &LeafletClassifier) -> Vec<Vec<Side>> {
        self.composition
            .lipid_types()
            .iter()
            .map(|lipid| {
                system
                    .positions_of(&lipid.heads)
                    .map(|position| classifier.side(position))
                    .collect()
            })
            .collect()
    }

    /// Processes one analyzed frame.
    ///
    /// The first call records the reference and reports 0 % for every type.
    pub fn process_frame(
        &mut self,
        system: &MolecularSystem,
        classifier: &LeafletClassifier,
    ) -> ScramblingFrame {
        let current = self.sides(system, classifier);
        let has_aggregate = self.composition.has_aggregate();

        let Some(reference) = &self.reference else {
            let rows = self
                .composition
                .lipid_types()
                .iter()
                .map(|lipid| (lipid.name.clone(), 0.0))
                .collect();
            self.reference = Some(current);
            return ScramblingFrame {
                time_ps: system.time(),
                rows,
                aggregate: has_aggregate.then_some(0.0),
            };
        };

        let mut total_scrambled = 0;
        let mut total_heads = 0;
        let rows = self
            .composition
            .lipid_types()
            .iter()
            .zip(reference.iter().zip(&current))
            .map(|(lipid, (reference_sides, current_sides))| {
                let scrambled = reference_sides
                    .iter()
                    .zip(current_sides)
                    .filter(|(before, now)| before != now)
                    .count();
                total_scrambled += scrambled;
                total_heads += current_sides.len();
                (lipid.name.clone(), percentage(scrambled, current_sides.len()))
            })
            .collect();

        ScramblingFrame {
            time_ps: system.time(),
            rows,
            aggregate: has_aggregate.then(|| percentage(total_scrambled, total_heads)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lipids::composition::LipidType;
    use crate::core::models::atom::Atom;
    use crate::core::models::simbox::SimBox;
    use crate::core::utils::geometry::Axis;
    use nalgebra::Point3;

    fn fixture() -> (MolecularSystem, LipidComposition) {
        let atoms = vec![
            Atom::new(1, "PO4", "POPC", 1, Point3::new(0.0, 0.0, 7.0)),
            Atom::new(2, "PO4", "POPC", 2, Point3::new(0.0, 0.0, 3.0)),
            Atom::new(3, "PO4", "POPC", 3, Point3::new(0.0, 0.0, 7.0)),
            Atom::new(4, "PO4", "POPC", 4, Point3::new(0.0, 0.0, 3.0)),
            Atom::new(5, "PO4", "POPE", 5, Point3::new(0.0, 0.0, 7.0)),
        ];
        let system = MolecularSystem::new("test", atoms, SimBox::new(10.0, 10.0, 10.0));
        let composition = LipidComposition::new(
            vec![0, 1, 2, 3, 4],
            vec![
                LipidType::new("POPC", vec![0, 1, 2, 3]),
                LipidType::new("POPE", vec![4]),
            ],
        )
        .unwrap();
        (system, composition)
    }

    fn move_to(system: &mut MolecularSystem, index: usize, z: f64) {
        system.atoms_mut()[index].position.z = z;
    }

    #[test]
    fn reference_frame_reports_zero_for_every_type() {
        let (system, composition) = fixture();
        let mut tracker = ScramblingRateTracker::new(&composition);
        let classifier = LeafletClassifier::new(Axis::Z, 5.0, 10.0);

        assert!(!tracker.has_reference());
        let frame = tracker.process_frame(&system, &classifier);
        assert!(tracker.has_reference());
        assert_eq!(
            frame.rows,
            vec![("POPC".to_string(), 0.0), ("POPE".to_string(), 0.0)]
        );
        assert_eq!(frame.aggregate, Some(0.0));
    }

    #[test]
    fn later_frames_report_share_of_heads_on_opposite_side() {
        let (mut system, composition) = fixture();
        let mut tracker = ScramblingRateTracker::new(&composition);
        let classifier = LeafletClassifier::new(Axis::Z, 5.0, 10.0);
        tracker.process_frame(&system, &classifier);

        move_to(&mut system, 0, 3.0);
        move_to(&mut system, 4, 4.0);
        system.set_frame_info(10_000.0, 5, SimBox::new(10.0, 10.0, 10.0));
        let frame = tracker.process_frame(&system, &classifier);

        assert_eq!(frame.time_ps, 10_000.0);
        assert!((frame.rows[0].1 - 25.0).abs() < 1e-9);
        assert!((frame.rows[1].1 - 100.0).abs() < 1e-9);
        assert!((frame.aggregate.unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn reference_is_never_replaced() {
        let (mut system, composition) = fixture();
        let mut tracker = ScramblingRateTracker::new(&composition);
        let classifier = LeafletClassifier::new(Axis::Z, 5.0, 10.0);
        tracker.process_frame(&system, &classifier);

        move_to(&mut system, 1, 8.0);
        let first = tracker.process_frame(&system, &classifier);
        let second = tracker.process_frame(&system, &classifier);
        assert!((first.rows[0].1 - 25.0).abs() < 1e-9);
        assert_eq!(first.rows, second.rows);
    }

    #[test]
    fn head_at_exact_center_counts_as_lower() {
        let (mut system, composition) = fixture();
        let mut tracker = ScramblingRateTracker::new(&composition);
        let classifier = LeafletClassifier::new(Axis::Z, 5.0, 10.0);
        tracker.process_frame(&system, &classifier);

        move_to(&mut system, 4, 5.0);
        let frame = tracker.process_frame(&system, &classifier);
        assert!((frame.rows[1].1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn single_type_has_no_aggregate() {
        let (system, _) = fixture();
        let composition =
            LipidComposition::new(vec![0, 1], vec![LipidType::new("POPC", vec![0, 1])]).unwrap();
        let mut tracker = ScramblingRateTracker::new(&composition);
        let classifier = LeafletClassifier::new(Axis::Z, 5.0, 10.0);
        assert_eq!(tracker.process_frame(&system, &classifier).aggregate, None);
        assert_eq!(tracker.process_frame(&system, &classifier).aggregate, None);
    }
}
