use phf::{Set, phf_set};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

static MARTINI_LIPIDS: Set<&'static str> = phf_set! {
    "DAPC", "DBPC", "DFPC", "DGPC", "DIPC", "DLPC", "DNPC", "DOPC", "DPPC", "DRPC", "DTPC",
    "DVPC", "DXPC", "DYPC", "LPPC", "PAPC", "PEPC", "PGPC", "PIPC", "POPC", "PRPC", "PUPC",
    "DAPE", "DBPE", "DFPE", "DGPE", "DIPE", "DLPE", "DNPE", "DOPE", "DPPE", "DRPE", "DTPE",
    "DUPE", "DVPE", "DXPE", "DYPE", "LPPE", "PAPE", "PGPE", "PIPE", "POPE", "PQPE", "PRPE",
    "PUPE", "DAPS", "DBPS", "DFPS", "DGPS", "DIPS", "DLPS", "DNPS", "DOPS", "DPPS", "DRPS",
    "DTPS", "DUPS", "DVPS", "DXPS", "DYPS", "LPPS", "PAPS", "PGPS", "PIPS", "POPS", "PQPS",
    "PRPS", "PUPS", "DAPG", "DBPG", "DFPG", "DGPG", "DIPG", "DLPG", "DNPG", "DOPG", "DPPG",
    "DRPG", "DTPG", "DVPG", "DXPG", "DYPG", "JFPG", "JPPG", "LPPG", "OPPG", "PAPG", "PGPG",
    "PIPG", "POPG", "PRPG", "DAPA", "DBPA", "DFPA", "DGPA", "DIPA", "DLPA", "DNPA", "DOPA",
    "DPPA", "DRPA", "DTPA", "DVPA", "DXPA", "DYPA", "LPPA", "PAPA", "PGPA", "PIPA", "POPA",
    "PRPA", "PUPA", "DPP1", "DPP2", "DPPI", "PAPI", "PIPI", "POP1", "POP2", "POP3", "POPI",
    "PUPI", "PVP1", "PVP2", "PVP3", "PVPI", "PADG", "PIDG", "PODG", "PUDG", "PVDG", "TOG",
    "APC", "CPC", "IPC", "LPC", "OPC", "PPC", "TPC", "UPC", "VPC", "BNSM", "DBSM", "DPSM",
    "DXSM", "PGSM", "PNSM", "POSM", "PVSM", "XNSM", "DPCE", "DXCE", "PNCE", "XNCE", "DBG1",
    "DPG1", "DPG3", "DPGS", "DXG1", "DXG3", "PNG1", "PNG3", "XNG1", "XNG3", "DFGG", "DFMG",
    "DPGG", "DPMG", "DPSG", "FPGG", "FPMG", "FPSG", "OPGG", "OPMG", "OPSG", "CHOA", "CHOL",
    "CHYO", "BOG", "DDM", "DPC", "EO5", "SDS", "BOLA", "BOLB", "CDL0", "CDL1", "CDL2", "CDL",
    "DBG3", "ERGO", "HBHT", "HDPT", "HHOP", "HOPR", "ACA", "ACN", "BCA", "BCN", "LCA", "LCN",
    "PCA", "PCN", "UCA", "UCN", "XCA", "XCN", "RAMP", "REMP", "OANT",
};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("I/O error for lipid file '{path}': {source}")]
    Io { path: String, source: io::Error },
    #[error("Invalid lipid name '{name}' on line {line}: names must not contain whitespace")]
    InvalidName { line: usize, name: String },
}

/// The set of residue names recognised as lipids.
///
/// Always contains the built-in Martini lipid names. Additional names can be
/// registered programmatically or loaded from a user file.
#[derive(Debug, Clone, Default)]
pub struct LipidRegistry {
    custom: Vec<String>,
}

impl LipidRegistry {
    /// Creates a registry containing only the built-in lipid names.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, residue_name: &str) -> bool {
        MARTINI_LIPIDS.contains(residue_name) || self.custom.iter().any(|n| n == residue_name)
    }

    /// Registers an additional lipid name.
    ///
    /// # Return
    ///
    /// Returns `false` (and leaves the registry unchanged) if the name is already known.
    pub fn add(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.custom.push(name.to_string());
        true
    }

    pub fn custom_names(&self) -> &[String] {
        &self.custom
    }

    pub fn builtin_count() -> usize {
        MARTINI_LIPIDS.len()
    }

    /// Reads additional lipid names, one per line.
    ///
    /// Everything after `#` is a comment. Names that are already registered are
    /// reported with a warning and skipped.
    ///
    /// # Return
    ///
    /// Returns the number of names that were added.
    pub fn extend_from_reader(
        &mut self,
        reader: &mut impl BufRead,
        source: &str,
    ) -> Result<usize, RegistryError> {
        let mut added = 0;
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res.map_err(|e| RegistryError::Io {
                path: source.to_string(),
                source: e,
            })?;
            let content = line.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            if content.contains(char::is_whitespace) {
                return Err(RegistryError::InvalidName {
                    line: line_num + 1,
                    name: content.to_string(),
                });
            }

            if self.add(content) {
                added += 1;
            } else {
                warn!(
                    "Lipid type '{}' from '{}' is already registered; skipping.",
                    content, source
                );
            }
        }
        debug!(added, source, "Loaded user lipid names.");
        Ok(added)
    }

    pub fn extend_from_path(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let source = path.to_string_lossy().to_string();
        let file = File::open(path).map_err(|e| RegistryError::Io {
            path: source.clone(),
            source: e,
        })?;
        let mut reader = BufReader::new(file);
        self.extend_from_reader(&mut reader, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::tempdir;

    #[test]
    fn new_registry_knows_builtin_martini_lipids() {
        let registry = LipidRegistry::new();
        assert!(registry.contains("POPC"));
        assert!(registry.contains("CHOL"));
        assert!(registry.contains("CDL2"));
        assert!(!registry.contains("W"));
        assert!(!registry.contains("popc"));
        assert!(LipidRegistry::builtin_count() > 200);
    }

    #[test]
    fn add_rejects_known_names() {
        let mut registry = LipidRegistry::new();
        assert!(registry.add("XYZL"));
        assert!(registry.contains("XYZL"));
        assert!(!registry.add("XYZL"));
        assert!(!registry.add("POPC"));
        assert_eq!(registry.custom_names(), ["XYZL".to_string()]);
    }

    #[test]
    fn extend_from_reader_skips_comments_blank_lines_and_duplicates() {
        let content = "# custom lipids\nAAAA\n\n  BBBB   # trailing comment\nPOPC\nAAAA\n";
        let mut registry = LipidRegistry::new();
        let added = registry
            .extend_from_reader(&mut Cursor::new(content), "lipids.txt")
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(
            registry.custom_names(),
            ["AAAA".to_string(), "BBBB".to_string()]
        );
    }

    #[test]
    fn extend_from_reader_rejects_names_with_whitespace() {
        let mut registry = LipidRegistry::new();
        let result = registry.extend_from_reader(&mut Cursor::new("AAAA\nBB BB\n"), "lipids.txt");
        assert!(matches!(
            result,
            Err(RegistryError::InvalidName { line: 2, .. })
        ));
    }

    #[test]
    fn extend_from_path_reads_file_and_reports_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lipids.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "CUST").unwrap();

        let mut registry = LipidRegistry::new();
        assert_eq!(registry.extend_from_path(&path).unwrap(), 1);
        assert!(registry.contains("CUST"));

        let missing = registry.extend_from_path(&dir.path().join("missing.txt"));
        assert!(matches!(missing, Err(RegistryError::Io { .. })));
    }
}
