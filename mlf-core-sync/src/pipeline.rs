//! Sync pipeline entrypoint used by the CLI.
//!
//! `run` checks for a template update, applies the project's sync level,
//! and hands the project to the [`BranchSyncEngine`].

use std::path::Path;

use mlf_core_core::config::load_sync_level;
use mlf_core_core::git::GitRepo;
use mlf_core_core::metadata;
use mlf_core_core::types::SyncLevel;
use mlf_core_core::TemplateRegistry;

use crate::classify::{self, should_sync, UpdateCheck};
use crate::engine::{BranchSyncEngine, SyncSession};
use crate::error::SyncError;

/// Branches whose `.mlf_core.yml` records the last synced template
/// version, in lookup order.
pub const UPDATE_CHECK_BRANCHES: [&str; 2] = ["development", "master"];

/// Result of a pipeline run.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Recorded and published template versions match.
    UpToDate(UpdateCheck),
    /// An update exists but is less severe than the project's sync level.
    BelowSyncLevel { check: UpdateCheck, level: SyncLevel },
    Synced { check: UpdateCheck, session: SyncSession },
}

/// Compare the template version recorded on `development` (or `master`
/// when there is no `development`) with the registry.
///
/// The originally checked-out branch is checked out again afterwards.
pub fn check_update(project_dir: &Path, registry: &TemplateRegistry) -> Result<UpdateCheck, SyncError> {
    let repo = GitRepo::open(project_dir)?;
    if repo.is_dirty()? {
        return Err(SyncError::Dirty { path: project_dir.to_path_buf() });
    }
    let original = repo.current_branch()?;
    let original = if original == "HEAD" { repo.head_oid()? } else { original };

    let base = UPDATE_CHECK_BRANCHES
        .iter()
        .find(|branch| repo.checkout(branch).is_ok())
        .ok_or(SyncError::NoBaseBranch)?;
    tracing::debug!("reading template version from branch {base}");

    let result = metadata::load(project_dir)
        .and_then(|meta| classify::check(&meta, registry))
        .map_err(SyncError::from);

    repo.checkout(&original)
        .map_err(|source| SyncError::RestoreFailed { branch: original.clone(), source })?;
    result
}

/// Check for an update and sync when the project's policy allows it.
pub fn run(
    project_dir: &Path,
    registry: &TemplateRegistry,
    engine: &BranchSyncEngine<'_>,
) -> Result<SyncOutcome, SyncError> {
    let check = check_update(project_dir, registry)?;
    if !check.is_update() {
        tracing::info!("template version {} is up to date", check.recorded);
        return Ok(SyncOutcome::UpToDate(check));
    }

    let level = load_sync_level(project_dir)?;
    if !should_sync(check.severity, level) {
        tracing::info!(
            "{} update {} -> {} is below sync level {level}",
            check.severity,
            check.recorded,
            check.published
        );
        return Ok(SyncOutcome::BelowSyncLevel { check, level });
    }

    let session = engine.sync(project_dir, &check.published, check.severity)?;
    Ok(SyncOutcome::Synced { check, session })
}
