//! Core data types for the selector.
//!
//! Candidate identity (`RepoSlug`), the slice of the GraphQL response the
//! qualification needs, and the per-candidate outcome.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::retry::AttemptFailure;

/// Owner/name pair of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Derive owner/name from a repository location by taking the last two
    /// `/`-separated segments.
    ///
    /// Trailing slashes are ignored. Returns `None` when fewer than two
    /// non-empty segments are present.
    ///
    /// # Examples
    /// ```
    /// use repo_corpus_selector::types::RepoSlug;
    ///
    /// let slug = RepoSlug::from_location("https://github.com/apache/commons-lang").unwrap();
    /// assert_eq!(slug.owner, "apache");
    /// assert_eq!(slug.name, "commons-lang");
    /// assert!(RepoSlug::from_location("commons-lang").is_none());
    /// ```
    #[must_use]
    pub fn from_location(location: &str) -> Option<Self> {
        let mut segments = location.trim_end_matches('/').rsplit('/');
        let name = segments.next()?;
        let owner = segments.next()?;
        if owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository fields returned by the qualification query.
///
/// Every level is optional: GitHub returns `null` for archived or empty
/// repositories and for repositories without a default branch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub primary_language: Option<Language>,
    pub default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Language {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchRef {
    pub target: Option<CommitTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitTarget {
    pub history: Option<CommitHistory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitHistory {
    #[serde(default)]
    pub edges: Vec<CommitEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitEdge {
    pub node: CommitNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub committed_date: String,
}

impl RepositoryNode {
    /// Primary language name, if GitHub reported one.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.primary_language.as_ref().map(|l| l.name.as_str())
    }

    /// Commit date of the most recent commit on the default branch.
    #[must_use]
    pub fn last_committed_date(&self) -> Option<&str> {
        self.default_branch_ref
            .as_ref()?
            .target
            .as_ref()?
            .history
            .as_ref()?
            .edges
            .first()
            .map(|edge| edge.node.committed_date.as_str())
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("location does not contain an owner/name pair")]
    InvalidLocation,

    #[error("repository not found or inaccessible")]
    RepositoryNotFound,

    #[error("no primary language, probably an empty or archived repository")]
    NoLanguageData,

    #[error("primary language is {found}")]
    LanguageMismatch { found: String },

    #[error("default branch has no commits")]
    NoCommitHistory,

    #[error("unparseable commit date '{0}'")]
    InvalidCommitDate(String),

    #[error("last commit was {age_days} days ago (limit {limit_days})")]
    TooOld { age_days: i64, limit_days: i64 },
}

/// Outcome of qualifying a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualification {
    /// Language matches and the last commit is recent enough.
    Accept { age_days: i64 },

    /// A filter failed or the data needed to decide is absent.
    Reject(RejectReason),

    /// Retry budget ran out before the API gave a usable answer.
    Exhausted {
        attempts: u32,
        last_error: AttemptFailure,
    },
}

impl Qualification {
    /// Whether the pipeline should clone this candidate.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_url() {
        let slug = RepoSlug::from_location("https://github.com/spring-projects/spring-boot").unwrap();
        assert_eq!(slug.owner, "spring-projects");
        assert_eq!(slug.name, "spring-boot");
        assert_eq!(slug.to_string(), "spring-projects/spring-boot");
    }

    #[test]
    fn test_slug_ignores_trailing_slash() {
        let slug = RepoSlug::from_location("https://github.com/google/guava/").unwrap();
        assert_eq!(slug.to_string(), "google/guava");
    }

    #[test]
    fn test_slug_plain_pair() {
        let slug = RepoSlug::from_location("google/guava").unwrap();
        assert_eq!(slug.owner, "google");
    }

    #[test]
    fn test_slug_invalid() {
        assert!(RepoSlug::from_location("").is_none());
        assert!(RepoSlug::from_location("guava").is_none());
        assert!(RepoSlug::from_location("/guava").is_none());
    }

    #[test]
    fn test_repository_node_accessors() {
        let node: RepositoryNode = serde_json::from_value(serde_json::json!({
            "primaryLanguage": { "name": "Java" },
            "defaultBranchRef": {
                "target": {
                    "history": {
                        "edges": [ { "node": { "committedDate": "2024-05-01T10:00:00Z" } } ]
                    }
                }
            }
        }))
        .unwrap();
        assert_eq!(node.language(), Some("Java"));
        assert_eq!(node.last_committed_date(), Some("2024-05-01T10:00:00Z"));
    }

    #[test]
    fn test_repository_node_nulls() {
        let node: RepositoryNode = serde_json::from_value(serde_json::json!({
            "primaryLanguage": null,
            "defaultBranchRef": null
        }))
        .unwrap();
        assert_eq!(node.language(), None);
        assert_eq!(node.last_committed_date(), None);
    }

    #[test]
    fn test_only_accept_is_accepted() {
        assert!(Qualification::Accept { age_days: 3 }.is_accepted());
        assert!(!Qualification::Reject(RejectReason::NoLanguageData).is_accepted());
        assert!(!Qualification::Exhausted {
            attempts: 5,
            last_error: AttemptFailure::Transport("reset".into()),
        }
        .is_accepted());
    }
}
