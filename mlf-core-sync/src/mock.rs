//! In-memory [`PullRequestClient`] for deterministic tests.
//!
//! Clones share state, so a test can hand one clone to the engine and
//! inspect the other afterwards.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::github::{NewPullRequest, PullRequestClient, PullRequestError, PullRequestSummary};

/// Which call should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    ListOpen(PullRequestError),
    Close(PullRequestError),
    Create(PullRequestError),
}

/// Recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListOpen,
    Close { number: u64 },
    Create { head: String, base: String, title: String },
}

#[derive(Debug, Default)]
struct Inner {
    open: BTreeMap<u64, PullRequestSummary>,
    next_number: u64,
    fail_on: Option<FailOn>,
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone, Default)]
pub struct MockPullRequests {
    inner: Arc<Mutex<Inner>>,
}

impl MockPullRequests {
    pub fn new() -> Self {
        Self::with_open(Vec::<(u64, &str)>::new())
    }

    /// Start with the given open pull requests `(number, title)`.
    pub fn with_open<S: Into<String>>(prs: Vec<(u64, S)>) -> Self {
        let open: BTreeMap<u64, PullRequestSummary> = prs
            .into_iter()
            .map(|(number, title)| {
                let summary = PullRequestSummary { number, title: title.into(), html_url: String::new() };
                (number, summary)
            })
            .collect();
        let next_number = open.keys().max().copied().unwrap_or(0) + 1;
        MockPullRequests {
            inner: Arc::new(Mutex::new(Inner { open, next_number, ..Inner::default() })),
        }
    }

    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    pub fn open_prs(&self) -> Vec<PullRequestSummary> {
        self.lock().open.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PullRequestClient for MockPullRequests {
    fn list_open(&self) -> Result<Vec<PullRequestSummary>, PullRequestError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::ListOpen);
        if let Some(FailOn::ListOpen(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        Ok(inner.open.values().cloned().collect())
    }

    fn close(&self, number: u64) -> Result<(), PullRequestError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Close { number });
        if let Some(FailOn::Close(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        inner
            .open
            .remove(&number)
            .map(drop)
            .ok_or_else(|| PullRequestError::NotFound(format!("pull request #{number}")))
    }

    fn create(&self, request: &NewPullRequest) -> Result<PullRequestSummary, PullRequestError> {
        let mut inner = self.lock();
        inner.operations.push(MockOperation::Create {
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
        });
        if let Some(FailOn::Create(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        let number = inner.next_number;
        inner.next_number += 1;
        let summary = PullRequestSummary {
            number,
            title: request.title.clone(),
            html_url: format!("https://github.com/mock/pull/{number}"),
        };
        inner.open.insert(number, summary.clone());
        Ok(summary)
    }
}
