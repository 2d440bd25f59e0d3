use super::atom::Atom;
use super::simbox::SimBox;
use nalgebra::Point3;

/// Represents a complete simulated system: atoms, box and the current frame time.
///
/// The system is loaded once from a structure file. Trajectory readers then
/// overwrite positions, box and time in place for every frame, so atom indices
/// stay stable for the whole run and can be used as identities by the
/// analysis trackers.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    /// Title line of the structure (or of the most recently read frame).
    title: String,
    /// Primary storage for atoms, indexed by their zero-based position in the file.
    atoms: Vec<Atom>,
    /// Periodic box of the current frame.
    simbox: SimBox,
    /// Simulation time of the current frame in picoseconds.
    time: f64,
    /// Integration step of the current frame.
    step: u64,
}

impl MolecularSystem {
    /// Creates a new system from already parsed atoms.
    ///
    /// # Arguments
    ///
    /// * `title` - The title of the structure.
    /// * `atoms` - The atoms in file order.
    /// * `simbox` - The periodic box.
    pub fn new(title: impl Into<String>, atoms: Vec<Atom>, simbox: SimBox) -> Self {
        Self {
            title: title.into(),
            atoms,
            simbox,
            time: 0.0,
            step: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Retrieves an immutable reference to an atom by its index.
    ///
    /// # Return
    ///
    /// Returns `Some(&Atom)` if the index is in range, otherwise `None`.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Returns all atoms in file order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (usize, &Atom)> {
        self.atoms.iter().enumerate()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Returns the positions of the atoms with the given indices.
    ///
    /// Indices out of range are skipped; callers resolve indices against the
    /// same system, so this never happens in a consistent run.
    pub fn positions_of<'a>(
        &'a self,
        indices: &'a [usize],
    ) -> impl Iterator<Item = &'a Point3<f64>> + 'a {
        indices
            .iter()
            .filter_map(move |&i| self.atoms.get(i).map(|atom| &atom.position))
    }

    pub fn simbox(&self) -> &SimBox {
        &self.simbox
    }

    /// Simulation time of the current frame in picoseconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Overwrites the frame-dependent state of the system.
    ///
    /// Used by trajectory readers after the positions have been updated.
    pub fn set_frame_info(&mut self, time: f64, step: u64, simbox: SimBox) {
        self.time = time;
        self.step = step;
        self.simbox = simbox;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Mutable access to atom positions for trajectory readers.
    pub(crate) fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }
}
