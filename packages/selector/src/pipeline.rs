//! Sequential selection pipeline: read candidates, qualify, clone.

use std::fs;
use std::path::Path;

use crate::candidates::CandidateSource;
use crate::client::QualificationClient;
use crate::clone::{clone_url, Cloner};
use crate::error::{Result, SelectorError};
use crate::github::RepositoryApi;
use crate::ledger::ProgressLedger;
use crate::policy::QualificationPolicy;
use crate::retry::Sleeper;
use crate::types::Qualification;

/// Position in the working set, reported before each evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// 1-based index of the candidate about to be evaluated.
    pub checked: usize,
    pub total: usize,
}

/// Receives progress events from [`Pipeline::run`].
pub trait ProgressObserver {
    /// Called before `location` is evaluated.
    fn on_checking(&mut self, progress: Progress, location: &str);

    /// Called once `location` has been qualified.
    fn on_qualified(&mut self, _location: &str, _qualification: &Qualification) {}
}

/// Observer that ignores every event.
impl ProgressObserver for () {
    fn on_checking(&mut self, _progress: Progress, _location: &str) {}
}

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidates skipped because the ledger already held them, including
    /// rows repeated within the input.
    pub skipped: usize,
    pub checked: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Rejections caused by running out of retries.
    pub exhausted: usize,
    pub cloned: usize,
    pub clone_failures: usize,
}

/// Drives candidates through qualification and cloning, one at a time.
pub struct Pipeline<A, S, C> {
    client: QualificationClient<A, S>,
    cloner: C,
}

impl<A, S, C> Pipeline<A, S, C>
where
    A: RepositoryApi,
    S: Sleeper,
    C: Cloner,
{
    pub fn new(client: QualificationClient<A, S>, cloner: C) -> Self {
        Self { client, cloner }
    }

    /// Run the pipeline over the candidates in `input_path`.
    ///
    /// Progress is kept in `<output_dir>/.history`; candidates found there
    /// are skipped. Accepted candidates are cloned into `output_dir`.
    pub fn run(
        &self,
        input_path: &Path,
        policy: &QualificationPolicy,
        output_dir: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<RunSummary> {
        let candidates = CandidateSource::read(input_path)?;

        fs::create_dir_all(output_dir).map_err(|source| SelectorError::OutputDirectory {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let mut ledger = ProgressLedger::open(output_dir)?;

        let working_set = candidates.working_set(ledger.entries());
        let mut summary = RunSummary {
            skipped: candidates.len() - working_set.len(),
            ..RunSummary::default()
        };
        if summary.skipped > 0 {
            tracing::info!(skipped = summary.skipped, "Skipping already checked repositories");
        }

        let total = working_set.len();
        tracing::info!(
            total,
            language = %policy.language,
            age_limit_years = policy.age_limit_years,
            "Starting qualification"
        );

        for (index, location) in working_set.iter().enumerate() {
            // Repeated rows are attempted once.
            if ledger.contains(location) {
                tracing::info!(candidate = %location, "Skipping duplicate candidate");
                summary.skipped += 1;
                continue;
            }

            let progress = Progress {
                checked: index + 1,
                total,
            };
            tracing::info!(
                candidate = %location,
                checked = progress.checked,
                total,
                "Checking"
            );
            observer.on_checking(progress, location);

            let qualification = self.client.evaluate(&mut ledger, location, policy)?;
            observer.on_qualified(location, &qualification);
            summary.checked += 1;

            match qualification {
                Qualification::Accept { .. } => {
                    summary.accepted += 1;
                    if self.cloner.clone_repo(&clone_url(location), output_dir)? {
                        summary.cloned += 1;
                    } else {
                        summary.clone_failures += 1;
                    }
                }
                Qualification::Reject(_) => summary.rejected += 1,
                Qualification::Exhausted { .. } => {
                    summary.rejected += 1;
                    summary.exhausted += 1;
                }
            }
        }

        tracing::info!(
            checked = summary.checked,
            accepted = summary.accepted,
            rejected = summary.rejected,
            cloned = summary.cloned,
            "Qualification finished"
        );
        Ok(summary)
    }
}
