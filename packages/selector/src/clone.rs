//! Cloning accepted repositories with the git CLI.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{Result, SelectorError};

/// Clones a repository into a working directory.
pub trait Cloner {
    /// Clone `url` with `workdir` as the current directory.
    ///
    /// Returns `Ok(false)` if the clone ran but failed, and an error only if
    /// it could not be started at all.
    fn clone_repo(&self, url: &str, workdir: &Path) -> Result<bool>;
}

impl<C: Cloner + ?Sized> Cloner for &C {
    fn clone_repo(&self, url: &str, workdir: &Path) -> Result<bool> {
        (**self).clone_repo(url, workdir)
    }
}

/// Runs `git clone <url>`.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: String,
}

impl Default for GitCloner {
    fn default() -> Self {
        Self {
            program: "git".into(),
        }
    }
}

impl GitCloner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Cloner for GitCloner {
    fn clone_repo(&self, url: &str, workdir: &Path) -> Result<bool> {
        tracing::info!(url, cwd = %workdir.display(), "Cloning");

        // git's progress goes straight to the terminal.
        let status = Command::new(&self.program)
            .args(["clone", url])
            .current_dir(workdir)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| SelectorError::Clone {
                url: url.to_string(),
                source,
            })?;

        if !status.success() {
            tracing::warn!(url, exit_code = ?status.code(), "git clone failed");
            return Ok(false);
        }
        Ok(true)
    }
}

/// Clone URL for a repository location.
///
/// # Examples
/// ```
/// use repo_corpus_selector::clone::clone_url;
///
/// assert_eq!(clone_url("https://github.com/a/b"), "https://github.com/a/b.git");
/// ```
#[must_use]
pub fn clone_url(location: &str) -> String {
    format!("{location}.git")
}

/// Counts from a bulk clone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloneSummary {
    pub cloned: usize,
    pub failed: usize,
}

/// Clone every repository listed in `file_path` (one location per line)
/// into `dest_dir`, creating it if needed.
pub fn clone_all<C: Cloner>(file_path: &Path, dest_dir: &Path, cloner: &C) -> Result<CloneSummary> {
    if !file_path.is_file() {
        return Err(SelectorError::InputNotFound(file_path.to_path_buf()));
    }

    if !dest_dir.is_dir() {
        tracing::info!(dest = %dest_dir.display(), "Destination does not exist, creating it");
        fs::create_dir_all(dest_dir).map_err(|source| SelectorError::OutputDirectory {
            path: dest_dir.to_path_buf(),
            source,
        })?;
    }

    let mut summary = CloneSummary::default();
    for line in BufReader::new(File::open(file_path)?).lines() {
        let line = line?;
        let location = line.trim();
        if location.is_empty() {
            continue;
        }
        if cloner.clone_repo(&clone_url(location), dest_dir)? {
            summary.cloned += 1;
        } else {
            summary.failed += 1;
        }
    }

    tracing::info!(
        cloned = summary.cloned,
        failed = summary.failed,
        dest = %dest_dir.display(),
        "All repositories have been cloned"
    );
    Ok(summary)
}
