//! Qualification of a single candidate.

use chrono::Utc;

use crate::error::Result;
use crate::github::RepositoryApi;
use crate::ledger::ProgressLedger;
use crate::policy::QualificationPolicy;
use crate::retry::{drive, RetryOutcome, RetryPolicy, Sleeper};
use crate::types::{Qualification, RejectReason, RepoSlug};

/// Queries the remote API for a candidate and decides on it.
pub struct QualificationClient<A, S> {
    api: A,
    retry: RetryPolicy,
    sleeper: S,
}

impl<A: RepositoryApi, S: Sleeper> QualificationClient<A, S> {
    pub fn new(api: A, retry: RetryPolicy, sleeper: S) -> Self {
        Self {
            api,
            retry,
            sleeper,
        }
    }

    /// Qualify `location`.
    ///
    /// The location is written to the ledger before any network call, so it
    /// is never attempted twice across runs. Only ledger failures are
    /// returned as errors; every per-candidate problem becomes a
    /// [`Qualification`].
    pub fn evaluate(
        &self,
        ledger: &mut ProgressLedger,
        location: &str,
        policy: &QualificationPolicy,
    ) -> Result<Qualification> {
        let slug = RepoSlug::from_location(location);
        ledger.append(location)?;

        let Some(slug) = slug else {
            let reason = RejectReason::InvalidLocation;
            tracing::warn!(candidate = location, reason = %reason, "Candidate rejected");
            return Ok(Qualification::Reject(reason));
        };

        let outcome = drive(&self.retry, &self.sleeper, |_| self.api.fetch_repository(&slug));

        let qualification = match outcome {
            RetryOutcome::Resolved(repository) => policy.decide(repository.as_ref(), Utc::now()),
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => Qualification::Exhausted {
                attempts,
                last_error,
            },
        };

        match &qualification {
            Qualification::Accept { age_days } => {
                tracing::info!(repo = %slug, age_days, "Candidate accepted");
            }
            Qualification::Reject(reason) => {
                tracing::info!(repo = %slug, reason = %reason, "Candidate rejected");
            }
            Qualification::Exhausted {
                attempts,
                last_error,
            } => {
                tracing::error!(
                    repo = %slug,
                    attempts,
                    error = %last_error,
                    "Max retries reached, giving up"
                );
            }
        }

        Ok(qualification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{AttemptFailure, RateLimitInfo};
    use crate::types::{Language, RepositoryNode};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::tempdir;

    type Reply = std::result::Result<Option<RepositoryNode>, AttemptFailure>;

    struct ScriptedApi {
        replies: RefCell<VecDeque<Reply>>,
        calls: RefCell<Vec<RepoSlug>>,
    }

    impl ScriptedApi {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl RepositoryApi for ScriptedApi {
        fn fetch_repository(&self, slug: &RepoSlug) -> Reply {
            self.calls.borrow_mut().push(slug.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(AttemptFailure::Transport("script exhausted".into())))
        }
    }

    /// Looks at the ledger file on disk at the moment of each call.
    struct LedgerCheckingApi {
        history: PathBuf,
        location: String,
        recorded: RefCell<Vec<bool>>,
    }

    impl RepositoryApi for LedgerCheckingApi {
        fn fetch_repository(&self, _slug: &RepoSlug) -> Reply {
            let on_disk = ProgressLedger::load(&self.history)
                .map(|entries| entries.contains(&self.location))
                .unwrap_or(false);
            self.recorded.borrow_mut().push(on_disk);
            Ok(None)
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) {}
    }

    fn policy() -> QualificationPolicy {
        QualificationPolicy::new("Java", 3)
    }

    fn no_language() -> Reply {
        Ok(Some(RepositoryNode {
            primary_language: None,
            default_branch_ref: None,
        }))
    }

    #[test]
    fn test_ledger_written_before_query() {
        let tmp = tempdir().unwrap();
        let mut ledger = ProgressLedger::open(tmp.path()).unwrap();
        let api = ScriptedApi::new(vec![no_language()]);
        let client = QualificationClient::new(&api, RetryPolicy::default(), NoSleep);

        let result = client
            .evaluate(&mut ledger, "https://github.com/a/b", &policy())
            .unwrap();

        assert_eq!(result, Qualification::Reject(RejectReason::NoLanguageData));
        assert!(ProgressLedger::open(tmp.path())
            .unwrap()
            .contains("https://github.com/a/b"));
        assert_eq!(api.calls.borrow()[0].to_string(), "a/b");
    }

    #[test]
    fn test_ledger_is_on_disk_when_the_query_runs() {
        let tmp = tempdir().unwrap();
        let mut ledger = ProgressLedger::open(tmp.path()).unwrap();
        let location = "https://github.com/a/b";
        let api = LedgerCheckingApi {
            history: ledger.path().to_path_buf(),
            location: location.to_string(),
            recorded: RefCell::new(Vec::new()),
        };
        let client = QualificationClient::new(&api, RetryPolicy::default(), NoSleep);

        client.evaluate(&mut ledger, location, &policy()).unwrap();

        assert_eq!(*api.recorded.borrow(), vec![true]);
    }

    #[test]
    fn test_missing_repository_is_not_retried() {
        let tmp = tempdir().unwrap();
        let mut ledger = ProgressLedger::open(tmp.path()).unwrap();
        let api = ScriptedApi::new(vec![Ok(None)]);
        let client = QualificationClient::new(&api, RetryPolicy::default(), NoSleep);

        let result = client
            .evaluate(&mut ledger, "https://github.com/gone/away", &policy())
            .unwrap();

        assert_eq!(result, Qualification::Reject(RejectReason::RepositoryNotFound));
        assert_eq!(api.calls.borrow().len(), 1);
    }

    #[test]
    fn test_invalid_location_skips_network() {
        let tmp = tempdir().unwrap();
        let mut ledger = ProgressLedger::open(tmp.path()).unwrap();
        let api = ScriptedApi::new(vec![]);
        let client = QualificationClient::new(&api, RetryPolicy::default(), NoSleep);

        let result = client.evaluate(&mut ledger, "not-a-repo", &policy()).unwrap();

        assert_eq!(result, Qualification::Reject(RejectReason::InvalidLocation));
        assert!(api.calls.borrow().is_empty());
        assert!(ledger.contains("not-a-repo"));
    }

    #[test]
    fn test_exhaustion_makes_no_sixth_call() {
        let tmp = tempdir().unwrap();
        let mut ledger = ProgressLedger::open(tmp.path()).unwrap();
        let api = ScriptedApi::new(vec![
            Err(AttemptFailure::RateLimited(RateLimitInfo::default())),
            Err(AttemptFailure::Transport("connection reset".into())),
            Err(AttemptFailure::RateLimited(RateLimitInfo::default())),
            Err(AttemptFailure::Http { status: 502 }),
            Err(AttemptFailure::RateLimited(RateLimitInfo::default())),
            Ok(Some(RepositoryNode {
                primary_language: Some(Language { name: "Java".into() }),
                default_branch_ref: None,
            })),
        ]);
        let client = QualificationClient::new(&api, RetryPolicy::default(), NoSleep);

        let result = client
            .evaluate(&mut ledger, "https://github.com/a/b", &policy())
            .unwrap();

        assert_eq!(
            result,
            Qualification::Exhausted {
                attempts: 5,
                last_error: AttemptFailure::RateLimited(RateLimitInfo::default()),
            }
        );
        assert!(!result.is_accepted());
        assert_eq!(api.calls.borrow().len(), 5);
    }

    #[test]
    fn test_exhaustion_is_logged_once() {
        let tmp = tempdir().unwrap();
        let mut ledger = ProgressLedger::open(tmp.path()).unwrap();
        let api = ScriptedApi::new(vec![]);
        let client = QualificationClient::new(&api, RetryPolicy::default(), NoSleep);

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            client.evaluate(&mut ledger, "https://github.com/a/b", &policy())
        })
        .unwrap();

        assert!(matches!(result, Qualification::Exhausted { attempts: 5, .. }));
        assert_eq!(logs.text().matches("giving up").count(), 1);
        assert_eq!(logs.text().matches("retrying").count(), 4);
    }
}
