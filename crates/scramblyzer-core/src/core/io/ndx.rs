use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NdxError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid atom number '{value}' on line {line}")]
    InvalidNumber { line: usize, value: String },
    #[error("Atom number {number} in group '{group}' is out of range (system has {n_atoms} atoms)")]
    OutOfRange {
        group: String,
        number: usize,
        n_atoms: usize,
    },
    #[error("Atom numbers on line {line} do not belong to any group")]
    EntryOutsideGroup { line: usize },
    #[error("Invalid group header on line {line}: '{content}'")]
    InvalidHeader { line: usize, content: String },
}

/// Named atom groups read from a GROMACS index (NDX) file.
///
/// Atom numbers in the file are 1-based; they are stored as zero-based
/// indices into the system's atom array. Group order is preserved and the
/// first group wins when a name appears more than once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexGroups {
    groups: Vec<(String, Vec<usize>)>,
}

impl IndexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads index groups and validates them against a system of `n_atoms` atoms.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed lines or atom numbers outside the system.
    pub fn read_from(reader: &mut impl BufRead, n_atoms: usize) -> Result<Self, NdxError> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let content = line.trim();
            if content.is_empty() {
                continue;
            }

            if content.starts_with('[') {
                let name = content
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| NdxError::InvalidHeader {
                        line: line_num,
                        content: content.to_string(),
                    })?;
                groups.push((name.to_string(), Vec::new()));
                continue;
            }

            let (group_name, indices) = groups
                .last_mut()
                .ok_or(NdxError::EntryOutsideGroup { line: line_num })?;

            for value in content.split_whitespace() {
                let number: usize = value.parse().map_err(|_| NdxError::InvalidNumber {
                    line: line_num,
                    value: value.to_string(),
                })?;
                if number == 0 || number > n_atoms {
                    return Err(NdxError::OutOfRange {
                        group: group_name.clone(),
                        number,
                        n_atoms,
                    });
                }
                indices.push(number - 1);
            }
        }

        Ok(Self { groups })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P, n_atoms: usize) -> Result<Self, NdxError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, n_atoms)
    }

    /// Atom indices of the group with the given name.
    pub fn get(&self, name: &str) -> Option<&[usize]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, indices)| indices.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
