//! Repo Corpus Selector - pick recently active repositories for a code corpus.
//!
//! Reads a table of candidate GitHub repositories, asks the GitHub GraphQL API
//! for each candidate's primary language and last commit date, and clones the
//! candidates that pass both filters. Progress is recorded in an append-only
//! ledger so an interrupted run resumes where it stopped.
//!
//! # Example
//!
//! ```
//! use repo_corpus_selector::types::RepoSlug;
//! use repo_corpus_selector::QualificationPolicy;
//!
//! let slug = RepoSlug::from_location("https://github.com/apache/maven").unwrap();
//! assert_eq!(slug.to_string(), "apache/maven");
//!
//! let policy = QualificationPolicy::new("Java", 3);
//! assert_eq!(policy.limit_days(), 1095);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and runtime settings
//! - [`error`]: Error types and Result alias
//! - [`types`]: Repository slugs, GraphQL response model, qualification outcome
//! - [`candidates`]: Candidate table parsing and working set
//! - [`ledger`]: Append-only progress ledger
//! - [`retry`]: Retry/backoff state machine
//! - [`github`]: GitHub GraphQL transport
//! - [`policy`]: Language and commit-age decision
//! - [`client`]: Per-candidate qualification
//! - [`clone`]: git clone collaborator and bulk clone
//! - [`pipeline`]: Sequential selection pipeline
//! - [`cli`]: Command-line interfaces

pub mod candidates;
pub mod cli;
pub mod client;
pub mod clone;
pub mod config;
pub mod error;
pub mod github;
pub mod ledger;
pub mod pipeline;
pub mod policy;
pub mod retry;
pub mod types;

pub use candidates::CandidateSource;
pub use client::QualificationClient;
pub use clone::{Cloner, GitCloner};
pub use config::SelectorConfig;
pub use error::{Result, SelectorError};
pub use github::{GitHubClient, RepositoryApi};
pub use ledger::ProgressLedger;
pub use pipeline::{Pipeline, Progress, ProgressObserver, RunSummary};
pub use policy::QualificationPolicy;
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use types::{Qualification, RejectReason, RepoSlug};
