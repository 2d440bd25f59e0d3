use crate::core::io::traits::{MolecularFile, TrajectoryReader};
use crate::core::models::atom::Atom;
use crate::core::models::simbox::SimBox;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

const DEFAULT_COORDINATE_WIDTH: usize = 8;
const COORDINATES_START: usize = 20;

#[derive(Debug, Error)]
pub enum GroError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: GroParseErrorKind },
    #[error("Unexpected end of file after line {line}")]
    UnexpectedEof { line: usize },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Frame {frame} contains {found} atoms but the structure contains {expected} atoms")]
    AtomCountMismatch {
        frame: usize,
        expected: usize,
        found: usize,
    },
    #[error("Frame {frame} does not specify simulation time ('t=') in its title")]
    MissingTime { frame: usize },
}

#[derive(Debug, Error)]
pub enum GroParseErrorKind {
    #[error("Invalid atom count (value: '{value}')")]
    InvalidAtomCount { value: String },
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for an atom record (must be at least {required} chars)")]
    LineTooShort { required: usize },
    #[error("Invalid box definition '{value}'")]
    InvalidBox { value: String },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

/// Reads one line, stripping the line terminator. Returns `None` at end of input.
fn next_line(reader: &mut impl BufRead, line_num: &mut usize) -> Result<Option<String>, GroError> {
    let mut buffer = String::new();
    if reader.read_line(&mut buffer)? == 0 {
        return Ok(None);
    }
    *line_num += 1;
    let trimmed_len = buffer.trim_end_matches(['\n', '\r']).len();
    buffer.truncate(trimmed_len);
    Ok(Some(buffer))
}

fn require_line(reader: &mut impl BufRead, line_num: &mut usize) -> Result<String, GroError> {
    next_line(reader, line_num)?.ok_or(GroError::UnexpectedEof { line: *line_num })
}

/// Extracts simulation time (`t=`) and step (`step=`) from a GRO title line.
pub fn parse_title_time(title: &str) -> (Option<f64>, Option<u64>) {
    let mut time = None;
    let mut step = None;
    let mut tokens = title.split_whitespace();

    while let Some(token) = tokens.next() {
        let (key, inline_value) = match token.split_once('=') {
            Some((key, value)) => (key, value),
            None => continue,
        };
        let value = if inline_value.is_empty() {
            tokens.next()
        } else {
            Some(inline_value)
        };
        match key {
            "t" => time = value.and_then(|v| v.parse().ok()),
            "step" => step = value.and_then(|v| v.parse().ok()),
            _ => {}
        }
    }
    (time, step)
}

/// Width of one coordinate field, derived from the spacing of decimal points.
fn detect_coordinate_width(line: &str) -> usize {
    let Some(coordinates) = line.get(COORDINATES_START..) else {
        return DEFAULT_COORDINATE_WIDTH;
    };
    let mut dots = coordinates.match_indices('.').map(|(i, _)| i);
    match (dots.next(), dots.next()) {
        (Some(first), Some(second)) if second > first => second - first,
        _ => DEFAULT_COORDINATE_WIDTH,
    }
}

fn parse_coordinates(line: &str, line_num: usize, width: usize) -> Result<Point3<f64>, GroError> {
    let required = COORDINATES_START + 3 * width;
    if line.len() < required {
        return Err(GroError::Parse {
            line: line_num,
            kind: GroParseErrorKind::LineTooShort { required },
        });
    }

    let mut xyz = [0.0; 3];
    for (dim, value) in xyz.iter_mut().enumerate() {
        let start = COORDINATES_START + dim * width;
        let raw = slice_and_trim(line, start, start + width);
        *value = raw.parse().map_err(|_| GroError::Parse {
            line: line_num,
            kind: GroParseErrorKind::InvalidFloat {
                columns: format!("{}-{}", start + 1, start + width),
                value: raw.into(),
            },
        })?;
    }
    Ok(Point3::new(xyz[0], xyz[1], xyz[2]))
}

fn parse_atom_line(line: &str, line_num: usize, width: usize) -> Result<Atom, GroError> {
    let position = parse_coordinates(line, line_num, width)?;

    let res_num_str = slice_and_trim(line, 0, 5);
    let res_name = slice_and_trim(line, 5, 10);
    let atom_name = slice_and_trim(line, 10, 15);
    let serial_str = slice_and_trim(line, 15, 20);

    let residue_number: isize = res_num_str.parse().map_err(|_| GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidInt {
            columns: "1-5".into(),
            value: res_num_str.into(),
        },
    })?;
    let serial: usize = serial_str.parse().map_err(|_| GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidInt {
            columns: "16-20".into(),
            value: serial_str.into(),
        },
    })?;

    Ok(Atom::new(serial, atom_name, res_name, residue_number, position))
}

fn parse_atom_count(line: &str, line_num: usize) -> Result<usize, GroError> {
    line.trim().parse().map_err(|_| GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidAtomCount {
            value: line.trim().into(),
        },
    })
}

fn parse_box(line: &str, line_num: usize) -> Result<SimBox, GroError> {
    let invalid = || GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidBox {
            value: line.trim().into(),
        },
    };

    let values = line
        .split_whitespace()
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;

    // Triclinic boxes carry six extra off-diagonal values; only the diagonal is kept.
    if values.len() != 3 && values.len() != 9 {
        return Err(invalid());
    }
    Ok(SimBox::new(values[0], values[1], values[2]))
}

/// GRO (GROMACS) structure file format.
pub struct GroFile;

impl MolecularFile for GroFile {
    type Error = GroError;

    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, Self::Error> {
        let mut line_num = 0;

        let title = next_line(reader, &mut line_num)?
            .ok_or_else(|| GroError::MissingRecord("title line".into()))?;
        let count_line = require_line(reader, &mut line_num)?;
        let n_atoms = parse_atom_count(&count_line, line_num)?;

        let mut atoms = Vec::with_capacity(n_atoms);
        let mut width = DEFAULT_COORDINATE_WIDTH;
        for i in 0..n_atoms {
            let line = require_line(reader, &mut line_num)?;
            if i == 0 {
                width = detect_coordinate_width(&line);
            }
            atoms.push(parse_atom_line(&line, line_num, width)?);
        }

        let box_line = require_line(reader, &mut line_num)?;
        let simbox = parse_box(&box_line, line_num)?;

        let (time, step) = parse_title_time(&title);
        let mut system = MolecularSystem::new(title.trim(), atoms, simbox);
        system.set_frame_info(time.unwrap_or(0.0), step.unwrap_or(0), simbox);
        Ok(system)
    }
}

/// Reader of multi-frame GRO trajectories.
///
/// Every frame must contain the same number of atoms as the structure the
/// frames are read into and must specify its simulation time in the title.
pub struct GroTrajectory<R: BufRead> {
    reader: R,
    line_num: usize,
    frames_read: usize,
}

impl GroTrajectory<BufReader<File>> {
    /// Opens a GRO trajectory file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GroError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> GroTrajectory<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_num: 0,
            frames_read: 0,
        }
    }

    /// Number of frames successfully read so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }
}

impl<R: BufRead> TrajectoryReader for GroTrajectory<R> {
    type Error = GroError;

    fn read_next_frame(&mut self, system: &mut MolecularSystem) -> Result<bool, Self::Error> {
        let frame = self.frames_read + 1;
        let title = loop {
            match next_line(&mut self.reader, &mut self.line_num)? {
                None => return Ok(false),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
            }
        };

        let count_line = require_line(&mut self.reader, &mut self.line_num)?;
        let n_atoms = parse_atom_count(&count_line, self.line_num)?;
        if n_atoms != system.atom_count() {
            return Err(GroError::AtomCountMismatch {
                frame,
                expected: system.atom_count(),
                found: n_atoms,
            });
        }

        let mut width = DEFAULT_COORDINATE_WIDTH;
        for (i, atom) in system.atoms_mut().iter_mut().enumerate() {
            let line = require_line(&mut self.reader, &mut self.line_num)?;
            if i == 0 {
                width = detect_coordinate_width(&line);
            }
            atom.position = parse_coordinates(&line, self.line_num, width)?;
        }

        let box_line = require_line(&mut self.reader, &mut self.line_num)?;
        let simbox = parse_box(&box_line, self.line_num)?;

        let (time, step) = parse_title_time(&title);
        let time = time.ok_or(GroError::MissingTime { frame })?;
        system.set_frame_info(time, step.unwrap_or(0), simbox);
        system.set_title(title.trim());

        self.frames_read = frame;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const STRUCTURE: &str = "\
Membrane t=   0.00000 step= 0
    4
    1POPC   PO4    1   1.000   2.000   6.500
    1POPC   C1A    2   1.100   2.100   5.900
    2POPC   PO4    3   3.000   4.000   2.500
    3W        W    4   0.500   0.500   0.500
   5.00000   5.00000  10.00000
";

    fn trajectory_frame(time: f64, z_first: f64) -> String {
        format!(
            "Membrane t= {:.5} step= {}\n    4\n    1POPC   PO4    1   1.000   2.000{:>8.3}\n    1POPC   C1A    2   1.100   2.100   5.900\n    2POPC   PO4    3   3.000   4.000   2.500\n    3W        W    4   0.500   0.500   0.500\n   5.00000   5.00000  10.00000\n",
            time,
            (time * 500.0) as u64,
            z_first
        )
    }

    #[test]
    fn read_from_parses_atoms_box_and_title_time() {
        let system = GroFile::read_from(&mut Cursor::new(STRUCTURE)).unwrap();
        assert_eq!(system.atom_count(), 4);
        assert_eq!(system.title(), "Membrane t=   0.00000 step= 0");
        assert_eq!(system.simbox().dimensions.z, 10.0);
        assert_eq!(system.time(), 0.0);

        let atom = system.atom(2).unwrap();
        assert_eq!(atom.serial, 3);
        assert_eq!(atom.name, "PO4");
        assert_eq!(atom.residue_name, "POPC");
        assert_eq!(atom.residue_number, 2);
        assert_eq!(atom.position, Point3::new(3.0, 4.0, 2.5));

        assert_eq!(system.atom(3).unwrap().residue_name, "W");
    }

    #[test]
    fn read_from_detects_higher_precision_coordinates() {
        let content = "\
high precision
    1
    1DPPC   PO4    1   1.00000   2.00000   3.25000
   4.00000   4.00000   8.00000
";
        let system = GroFile::read_from(&mut Cursor::new(content)).unwrap();
        assert_eq!(system.atom(0).unwrap().position, Point3::new(1.0, 2.0, 3.25));
    }

    #[test]
    fn read_from_keeps_diagonal_of_triclinic_box() {
        let content = "\
triclinic
    1
    1DPPC   PO4    1   1.000   2.000   3.000
   4.00000   5.00000   6.00000   0.00000   0.00000   1.00000   0.00000   1.00000   1.00000
";
        let system = GroFile::read_from(&mut Cursor::new(content)).unwrap();
        assert_eq!(system.simbox(), &SimBox::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn read_from_fails_on_invalid_coordinate() {
        let content = "\
bad
    1
    1DPPC   PO4    1   1.000   x.yyy   3.000
   4.00000   5.00000   6.00000
";
        let result = GroFile::read_from(&mut Cursor::new(content));
        assert!(matches!(
            result,
            Err(GroError::Parse {
                line: 3,
                kind: GroParseErrorKind::InvalidFloat { .. }
            })
        ));
    }

    #[test]
    fn read_from_fails_on_truncated_file() {
        let content = "truncated\n    2\n    1DPPC   PO4    1   1.000   2.000   3.000\n";
        let result = GroFile::read_from(&mut Cursor::new(content));
        assert!(matches!(result, Err(GroError::UnexpectedEof { .. })));
    }

    #[test]
    fn read_from_fails_on_empty_input() {
        let result = GroFile::read_from(&mut Cursor::new(""));
        assert!(matches!(result, Err(GroError::MissingRecord(_))));
    }

    #[test]
    fn read_from_fails_on_invalid_box() {
        let content = "box\n    1\n    1DPPC   PO4    1   1.000   2.000   3.000\n   4.0 5.0\n";
        let result = GroFile::read_from(&mut Cursor::new(content));
        assert!(matches!(
            result,
            Err(GroError::Parse {
                kind: GroParseErrorKind::InvalidBox { .. },
                ..
            })
        ));
    }

    #[test]
    fn parse_title_time_handles_separated_and_inline_values() {
        assert_eq!(
            parse_title_time("Generated by trjconv : t= 1000.00000 step= 500000"),
            (Some(1000.0), Some(500000))
        );
        assert_eq!(parse_title_time("t=20.5 step=41"), (Some(20.5), Some(41)));
        assert_eq!(parse_title_time("no time here"), (None, None));
    }

    #[test]
    fn trajectory_updates_positions_time_and_step_in_place() {
        let mut system = GroFile::read_from(&mut Cursor::new(STRUCTURE)).unwrap();
        let content = format!("{}{}", trajectory_frame(1000.0, 7.25), trajectory_frame(2000.0, 8.5));
        let mut trajectory = GroTrajectory::new(Cursor::new(content));

        assert!(trajectory.read_next_frame(&mut system).unwrap());
        assert_eq!(system.time(), 1000.0);
        assert_eq!(system.step(), 500000);
        assert_eq!(system.atom(0).unwrap().position.z, 7.25);
        assert_eq!(system.atom(0).unwrap().name, "PO4");

        assert!(trajectory.read_next_frame(&mut system).unwrap());
        assert_eq!(system.time(), 2000.0);
        assert_eq!(system.atom(0).unwrap().position.z, 8.5);

        assert!(!trajectory.read_next_frame(&mut system).unwrap());
        assert_eq!(trajectory.frames_read(), 2);
    }

    #[test]
    fn trajectory_rejects_frame_with_different_atom_count() {
        let mut system = GroFile::read_from(&mut Cursor::new(STRUCTURE)).unwrap();
        let content = "t= 0.0\n    1\n    1DPPC   PO4    1   1.000   2.000   3.000\n   4.0 5.0 6.0\n";
        let mut trajectory = GroTrajectory::new(Cursor::new(content));
        let result = trajectory.read_next_frame(&mut system);
        assert!(matches!(
            result,
            Err(GroError::AtomCountMismatch {
                frame: 1,
                expected: 4,
                found: 1
            })
        ));
    }

    #[test]
    fn trajectory_requires_time_in_title() {
        let mut system = GroFile::read_from(&mut Cursor::new(STRUCTURE)).unwrap();
        let mut trajectory = GroTrajectory::new(Cursor::new(STRUCTURE.replace("t=   0.00000 ", "")));
        let result = trajectory.read_next_frame(&mut system);
        assert!(matches!(result, Err(GroError::MissingTime { frame: 1 })));
    }
}
