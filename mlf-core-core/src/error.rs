//! Error types for mlf-core-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from reading or writing project state.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The project identity file `.mlf_core.yml` is missing.
    #[error("{path} is not an mlf-core project (no .mlf_core.yml found)")]
    NotAnMlfCoreProject { path: PathBuf },

    /// `mlf_core.cfg` is missing.
    #[error("no mlf_core.cfg found at {path}")]
    MissingConfig { path: PathBuf },

    /// `mlf_core.cfg` exists but could not be parsed as INI.
    #[error("failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A required section or key is missing or holds an invalid value.
    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A version string does not have the form `MAJOR.MINOR.PATCH[-SNAPSHOT]`.
    #[error("invalid version '{version}': expected the form 0.0.0 or 0.0.0-SNAPSHOT")]
    InvalidVersion { version: String },

    /// The template handle has no entry in the template registry.
    #[error("unknown template handle '{handle}'")]
    UnknownHandle { handle: String },

    /// The template registry itself is malformed.
    #[error("malformed template registry: {message}")]
    Registry { message: String },

    /// No `mlruns/` directory to fix artifact paths in.
    #[error("no MLflow tracking store at {path}")]
    NoTrackingStore { path: PathBuf },

    /// `dirs::config_dir()` returned `None`.
    #[error("cannot determine the user config directory; set $HOME or $XDG_CONFIG_HOME")]
    ConfigDirNotFound,
}
