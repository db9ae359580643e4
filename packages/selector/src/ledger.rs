//! Append-only record of candidates that have been attempted.
//!
//! The ledger is a plain text file (`.history`) in the output directory with
//! one location per line. Every append is flushed and synced before it
//! returns, so a candidate recorded here is never queried again, even if the
//! process dies right after the write.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::HISTORY_FILE_NAME;
use crate::error::{Result, SelectorError};

/// Progress ledger backed by `<dir>/.history`.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    entries: HashSet<String>,
}

impl ProgressLedger {
    /// Open the ledger in `dir`, loading any history from earlier runs.
    ///
    /// The file is not created until the first append.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(HISTORY_FILE_NAME);
        let entries = Self::load(&path)?;
        Ok(Self { path, entries })
    }

    /// Read the full history at `path`.
    ///
    /// A missing file is an empty history, not an error.
    pub fn load(path: &Path) -> Result<HashSet<String>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(source) => {
                return Err(SelectorError::Ledger {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut entries = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| SelectorError::Ledger {
                path: path.to_path_buf(),
                source,
            })?;
            let line = line.trim();
            if !line.is_empty() {
                entries.insert(line.to_string());
            }
        }
        Ok(entries)
    }

    /// Whether `location` was attempted in this or an earlier run.
    #[must_use]
    pub fn contains(&self, location: &str) -> bool {
        self.entries.contains(location)
    }

    /// Record `location` durably.
    pub fn append(&mut self, location: &str) -> Result<()> {
        let ledger_err = |source| SelectorError::Ledger {
            path: self.path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(ledger_err)?;
        writeln!(file, "{location}").map_err(ledger_err)?;
        file.flush().map_err(ledger_err)?;
        file.sync_data().map_err(ledger_err)?;

        self.entries.insert(location.to_string());
        Ok(())
    }

    /// All locations recorded so far.
    #[must_use]
    pub fn entries(&self) -> &HashSet<String> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
