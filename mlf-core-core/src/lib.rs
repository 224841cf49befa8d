//! mlf-core core library: domain types, project state on disk, errors.
//!
//! Public API surface:
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`ProjectError`]
//! - [`version`]: version parsing, comparison and in-text matching
//! - [`metadata`]: the `.mlf_core.yml` identity file
//! - [`config`]: the `mlf_core.cfg` project config
//! - [`registry`]: the bundled template registry
//! - [`user_config`]: per-user settings and token storage
//! - [`git`]: the `git` command-line wrapper
//! - [`mlruns`]: artifact path repair for local MLflow tracking stores

pub mod config;
pub mod error;
pub mod fs_util;
pub mod git;
pub mod metadata;
pub mod mlruns;
pub mod registry;
pub mod types;
pub mod user_config;
pub mod version;

pub use config::ProjectConfig;
pub use error::ProjectError;
pub use git::{GitError, GitRepo};
pub use registry::TemplateRegistry;
pub use types::{
    BlacklistGlobSet, ChangeSeverity, ProjectMetadata, SyncLevel, TemplateHandle,
    TemplateRegistryEntry,
};
pub use version::Version;
