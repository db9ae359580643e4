//! Accept/reject decision for a queried repository.

use chrono::{DateTime, Utc};

use crate::config::DAYS_PER_YEAR;
use crate::types::{Qualification, RejectReason, RepositoryNode};

/// Language and recency filter applied to every candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualificationPolicy {
    /// Canonical language name as GitHub reports it (e.g. "Java").
    pub language: String,
    /// Maximum age of the last commit, in 365-day years.
    pub age_limit_years: u32,
}

impl QualificationPolicy {
    pub fn new(language: impl Into<String>, age_limit_years: u32) -> Self {
        Self {
            language: language.into(),
            age_limit_years,
        }
    }

    /// Age limit in days. Leap years are not accounted for.
    #[must_use]
    pub fn limit_days(&self) -> i64 {
        i64::from(self.age_limit_years) * DAYS_PER_YEAR
    }

    /// Decide on a query result. `None` means the repository was not found.
    ///
    /// The language comparison is exact and case-sensitive; the candidate is
    /// accepted only if its last commit is strictly younger than the limit.
    #[must_use]
    pub fn decide(&self, repository: Option<&RepositoryNode>, now: DateTime<Utc>) -> Qualification {
        let Some(repository) = repository else {
            return Qualification::Reject(RejectReason::RepositoryNotFound);
        };

        let Some(language) = repository.language() else {
            return Qualification::Reject(RejectReason::NoLanguageData);
        };
        tracing::info!(language, "Primary language");
        if language != self.language {
            return Qualification::Reject(RejectReason::LanguageMismatch {
                found: language.to_string(),
            });
        }

        let Some(committed) = repository.last_committed_date() else {
            return Qualification::Reject(RejectReason::NoCommitHistory);
        };
        let committed = match parse_commit_date(committed) {
            Some(date) => date,
            None => return Qualification::Reject(RejectReason::InvalidCommitDate(committed.into())),
        };

        let age_days = (now - committed).num_days();
        tracing::info!(age_days, "Last commit age");
        let limit_days = self.limit_days();
        if age_days < limit_days {
            Qualification::Accept { age_days }
        } else {
            Qualification::Reject(RejectReason::TooOld {
                age_days,
                limit_days,
            })
        }
    }
}

/// Parse an ISO-8601 commit timestamp, accepting a trailing `Z`.
fn parse_commit_date(value: &str) -> Option<DateTime<Utc>> {
    let normalized = match value.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => value.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
