//! # mlf-core-sync
//!
//! Template synchronization for mlf-core projects.
//!
//! [`pipeline::run`] compares the project's recorded template version with
//! the registry, applies the sync level policy and drives the
//! [`BranchSyncEngine`]: re-render on the `TEMPLATE` branch, commit what is
//! not blacklisted, push, and open a pull request into `development`.

pub mod blacklist;
pub mod classify;
pub mod engine;
pub mod error;
pub mod github;
pub mod mock;
pub mod pipeline;

pub use blacklist::{Blacklist, Partition};
pub use classify::{classify, should_sync, UpdateCheck};
pub use engine::{BranchSyncEngine, SyncSession, SyncState, TEMPLATE_BRANCH};
pub use error::SyncError;
pub use github::{GithubClient, PullRequestClient, PullRequestError, PullRequestSummary};
pub use pipeline::{check_update, run, SyncOutcome};
