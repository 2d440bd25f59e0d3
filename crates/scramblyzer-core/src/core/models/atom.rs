use nalgebra::Point3;

/// Represents a single atom (or coarse-grained bead) of a simulated system.
///
/// Atoms carry the identity information read from the structure file and a
/// position that is refreshed in place every time a trajectory frame is read.
/// The analysis core only ever reads positions; it never moves atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom number as written in the structure file (1-based, may wrap).
    pub serial: usize,
    /// The name of the atom (e.g., "PO4", "NC3", "P").
    pub name: String,
    /// The name of the residue (molecule) this atom belongs to (e.g., "POPC").
    pub residue_name: String,
    /// The residue number as written in the structure file.
    pub residue_number: isize,
    /// The current 3D coordinates of the atom in nanometers.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom`.
    ///
    /// # Arguments
    ///
    /// * `serial` - The atom number from the structure file.
    /// * `name` - The name of the atom.
    /// * `residue_name` - The name of the parent residue.
    /// * `residue_number` - The number of the parent residue.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(
        serial: usize,
        name: &str,
        residue_name: &str,
        residue_number: isize,
        position: Point3<f64>,
    ) -> Self {
        Self {
            serial,
            name: name.to_string(),
            residue_name: residue_name.to_string(),
            residue_number,
            position,
        }
    }
}
