//! Error types for mlf-core-lint.

use std::path::PathBuf;

use thiserror::Error;

use mlf_core_core::ProjectError;

/// Errors that stop linting altogether. Every other finding is accumulated
/// in a [`LintReport`](crate::LintReport).
#[derive(Debug, Error)]
pub enum LintError {
    /// Missing identity file, unparsable metadata, or unknown handle.
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// The handle resolves in the registry but no check table exists for it.
    #[error("unable to find a linter for handle '{handle}'")]
    NoLinter { handle: String },

    #[error("lint io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LintError {
    LintError::Io { path: path.into(), source }
}
