use crate::core::models::system::MolecularSystem;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Defines the interface for reading structure file formats.
///
/// Implementors parse a single frame into a fresh [`MolecularSystem`], which
/// then serves as the topology for the rest of the analysis.
pub trait MolecularFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a molecular system from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error>;

    /// Reads a molecular system from a file path.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the file to read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<MolecularSystem, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// A source of trajectory frames.
///
/// Each call overwrites the positions, box, time and step of an existing
/// system in place, so that atom indices resolved against the structure stay
/// valid for the whole trajectory.
pub trait TrajectoryReader {
    /// The error type of the reader.
    type Error: Error + Send + Sync + 'static;

    /// Reads the next frame into `system`.
    ///
    /// # Return
    ///
    /// Returns `Ok(true)` if a frame was read and `Ok(false)` at the end of the trajectory.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame is malformed or does not match the system.
    fn read_next_frame(&mut self, system: &mut MolecularSystem) -> Result<bool, Self::Error>;
}
