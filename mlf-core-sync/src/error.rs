//! Error types for mlf-core-sync.

use std::path::PathBuf;

use thiserror::Error;

use mlf_core_core::{GitError, ProjectError};
use mlf_core_renderer::RenderError;

use crate::github::PullRequestError;

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing identity file, malformed `mlf_core.cfg`, unknown handle.
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("{path} is not the root of a git repository")]
    NotARepoRoot { path: PathBuf },

    /// Staged, unstaged or untracked changes exist. Nothing was touched.
    #[error(
        "{path} has uncommitted changes; commit or stash them before syncing \
         (untracked files count too)"
    )]
    Dirty { path: PathBuf },

    #[error("neither origin/TEMPLATE nor a local TEMPLATE branch exists")]
    NoTemplateBranch,

    #[error("neither a development nor a master branch exists")]
    NoBaseBranch,

    #[error("invalid glob '{pattern}' in [sync_files_blacklisted]: {message}")]
    InvalidGlob { pattern: String, message: String },

    /// The branches were pushed but the pull request could not be opened.
    #[error(
        "pushed branch {branch} but could not open the pull request: {source}; \
         open it manually from {branch} into development"
    )]
    PullRequest {
        branch: String,
        #[source]
        source: PullRequestError,
    },

    /// Checking out the original branch failed after the sync.
    #[error(
        "could not check out the original branch {branch}: {source}; \
         the repository may be left in an inconsistent state"
    )]
    RestoreFailed {
        branch: String,
        #[source]
        source: GitError,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io { path: path.into(), source }
}
