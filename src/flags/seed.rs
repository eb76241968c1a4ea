use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::{validate_flag_name, Flag, FlagService};
use crate::error::{FlagError, Result};

/// Outcome of a best-effort seed load.
#[derive(Debug, Default)]
pub struct SeedReport {
    pub source_found: bool,
    pub loaded: usize,
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug)]
pub struct RejectedRecord {
    pub index: usize,
    pub reason: String,
}

// Either `[...]` or `{"flags": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum SeedDocument {
    List(Vec<Value>),
    Wrapped { flags: Vec<Value> },
}

impl SeedDocument {
    fn into_records(self) -> Vec<Value> {
        match self {
            SeedDocument::List(records) | SeedDocument::Wrapped { flags: records } => records,
        }
    }
}

impl FlagService {
    /// Reads the seed file at `path` and stores every valid record.
    ///
    /// A missing file is not an error. Bad records are skipped and listed in
    /// the report; only an unreadable file or a malformed document fails.
    pub fn load_seed(&self, path: impl AsRef<Path>) -> Result<SeedReport> {
        let path = path.as_ref();

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "seed file not found, starting empty");
                return Ok(SeedReport::default());
            }
            Err(source) => {
                return Err(FlagError::SeedRead { path: path.to_path_buf(), source });
            }
        };

        let document: SeedDocument = serde_json::from_str(&raw).map_err(|source| FlagError::SeedFormat {
            path: PathBuf::from(path),
            source,
        })?;

        Ok(self.load_records(document.into_records()))
    }

    /// Stores each record in order, skipping the ones that do not decode.
    pub fn load_records(&self, records: Vec<Value>) -> SeedReport {
        let mut report = SeedReport { source_found: true, ..Default::default() };

        for (index, record) in records.into_iter().enumerate() {
            match decode_record(record) {
                Ok(flag) => {
                    self.put(flag);
                    report.loaded += 1;
                }
                Err(reason) => {
                    tracing::warn!(index, %reason, "skipping seed record");
                    report.rejected.push(RejectedRecord { index, reason });
                }
            }
        }

        report
    }
}

fn decode_record(record: Value) -> Result<Flag, String> {
    let flag: Flag = serde_json::from_value(record).map_err(|e| e.to_string())?;
    validate_flag_name(&flag.name)?;
    Ok(flag)
}
