//! Error types for mlf-core-bump.

use std::path::PathBuf;

use thiserror::Error;

use mlf_core_core::{GitError, ProjectError};

/// Errors that can arise while checking or performing a version bump.
#[derive(Debug, Error)]
pub enum BumpError {
    /// Missing or malformed `mlf_core.cfg`, or an invalid version string.
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error("the new version {version} cannot be equal to the current version")]
    SameVersion { version: String },

    #[error(
        "cannot bump {current} to {new}: a SNAPSHOT version can only be bumped \
         to its non-snapshot equivalent {release}"
    )]
    SnapshotToOther { current: String, new: String, release: String },

    #[error("cannot downgrade {current} to its SNAPSHOT version {new} without --downgrade")]
    NeedsDowngrade { current: String, new: String },

    #[error("the new version {new} is not greater than the current version {current}")]
    NotGreater { current: String, new: String },

    #[error("no file named CHANGELOG.rst found at {path}")]
    MissingChangelog { path: PathBuf },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("bump io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BumpError {
    BumpError::Io { path: path.into(), source }
}
