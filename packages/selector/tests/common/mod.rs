//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use repo_corpus_selector::pipeline::{Progress, ProgressObserver};
use repo_corpus_selector::retry::{AttemptFailure, RateLimitInfo};
use repo_corpus_selector::types::{
    BranchRef, CommitEdge, CommitHistory, CommitNode, CommitTarget, Language, Qualification,
    RepoSlug, RepositoryNode,
};
use repo_corpus_selector::{Cloner, RepositoryApi, Result, Sleeper};

pub type Reply = std::result::Result<Option<RepositoryNode>, AttemptFailure>;

/// API double answering from a per-repository script.
#[derive(Default)]
pub struct ScriptedApi {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for `owner/name`, answered in order.
    pub fn script(self, slug: &str, replies: Vec<Reply>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(slug.to_string(), replies.into());
        self
    }

    /// Every `owner/name` queried, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RepositoryApi for ScriptedApi {
    fn fetch_repository(&self, slug: &RepoSlug) -> Reply {
        let key = slug.to_string();
        self.calls.lock().unwrap().push(key.clone());
        self.replies
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| panic!("no scripted reply left for {key}"))
    }
}

/// Cloner double recording every invocation.
#[derive(Default)]
pub struct RecordingCloner {
    calls: Mutex<Vec<(String, PathBuf)>>,
    succeed: bool,
}

impl RecordingCloner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            succeed: true,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            succeed: false,
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn workdirs(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, dir)| dir.clone())
            .collect()
    }
}

impl Cloner for RecordingCloner {
    fn clone_repo(&self, url: &str, workdir: &Path) -> Result<bool> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), workdir.to_path_buf()));
        Ok(self.succeed)
    }
}

/// Sleeper double that returns immediately and remembers the waits.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// Observer recording progress and outcomes.
#[derive(Default)]
pub struct RecordingObserver {
    pub progress: Vec<Progress>,
    pub outcomes: Vec<(String, Qualification)>,
}

impl ProgressObserver for RecordingObserver {
    fn on_checking(&mut self, progress: Progress, _location: &str) {
        self.progress.push(progress);
    }

    fn on_qualified(&mut self, location: &str, qualification: &Qualification) {
        self.outcomes
            .push((location.to_string(), qualification.clone()));
    }
}

/// Repository in `language` whose last commit was `days` days ago.
pub fn repo(language: &str, days: i64) -> Reply {
    let committed = Utc::now() - chrono::Duration::days(days);
    Ok(Some(RepositoryNode {
        primary_language: Some(Language {
            name: language.to_string(),
        }),
        default_branch_ref: Some(BranchRef {
            target: Some(CommitTarget {
                history: Some(CommitHistory {
                    edges: vec![CommitEdge {
                        node: CommitNode {
                            committed_date: committed.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                        },
                    }],
                }),
            }),
        }),
    }))
}

pub fn rate_limited(retry_after: Option<u64>) -> Reply {
    Err(AttemptFailure::RateLimited(RateLimitInfo {
        retry_after,
        ..RateLimitInfo::default()
    }))
}
