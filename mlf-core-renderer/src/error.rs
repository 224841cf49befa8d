//! Error types for mlf-core-renderer.

use std::path::PathBuf;

use thiserror::Error;

use mlf_core_core::ProjectError;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Writing the identity file or reading the registry failed.
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Filesystem error while writing rendered output.
    #[error("render io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No template is shipped for this handle.
    #[error("no template available for handle '{handle}'")]
    UnknownTemplate { handle: String },

    /// The registry and the shipped templates disagree.
    #[error("template registry does not match the shipped templates: {message}")]
    RegistryMismatch { message: String },

    /// The project directory to render into already exists.
    #[error("{path} already exists; refusing to overwrite it")]
    TargetExists { path: PathBuf },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}
