//! The branch sync state machine.
//!
//! ```text
//! Idle → Inspecting → BranchCheckedOut → FilesWiped → Rendered → Committed
//!      → Pushed → PullRequestOpened → Restored
//! ```
//!
//! Any failure after `Inspecting` moves to `Aborting`, which discards the
//! half-done work on `TEMPLATE` and still ends in `Restored`. A run without
//! template changes goes from `Committed` straight to `Restored`, and so does
//! a local-only run (no GitHub repository or no pull request client).

use std::path::{Path, PathBuf};

use mlf_core_core::config::ProjectConfig;
use mlf_core_core::fs_util::{copy_tree, remove_all_except};
use mlf_core_core::git::GitRepo;
use mlf_core_core::metadata;
use mlf_core_core::types::{ChangeSeverity, ProjectMetadata};
use mlf_core_renderer::TemplateRenderer;

use crate::blacklist::Blacklist;
use crate::error::{io_err, SyncError};
use crate::github::{open_sync_pull_request, sync_branch_name, PullRequestClient, PullRequestSummary};

/// Branch holding the pristine rendered template.
pub const TEMPLATE_BRANCH: &str = "TEMPLATE";
pub const DEFAULT_REMOTE: &str = "origin";
pub const SYNC_COMMIT_MESSAGE: &str = "mlf-core sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Inspecting,
    BranchCheckedOut,
    FilesWiped,
    Rendered,
    Committed,
    Pushed,
    PullRequestOpened,
    Aborting,
    Restored,
}

/// One sync run. Created by [`BranchSyncEngine::sync`] and returned on success.
#[derive(Debug, Clone)]
pub struct SyncSession {
    pub project_dir: PathBuf,
    /// Branch (or commit, when detached) checked out before the run.
    pub original_branch: String,
    pub new_version: String,
    pub severity: ChangeSeverity,
    pub made_changes: bool,
    pub state: SyncState,
    /// Every state entered, in order.
    pub history: Vec<SyncState>,
    /// Paths committed to `TEMPLATE`.
    pub committed: Vec<String>,
    /// Changed paths matching a blacklist glob, left as they were.
    pub kept: Vec<String>,
    pub pull_request: Option<PullRequestSummary>,
}

impl SyncSession {
    fn new(project_dir: &Path, new_version: &str, severity: ChangeSeverity) -> Self {
        SyncSession {
            project_dir: project_dir.to_path_buf(),
            original_branch: String::new(),
            new_version: new_version.to_string(),
            severity,
            made_changes: false,
            state: SyncState::Idle,
            history: vec![SyncState::Idle],
            committed: Vec::new(),
            kept: Vec::new(),
            pull_request: None,
        }
    }

    fn advance(&mut self, state: SyncState) {
        tracing::debug!("sync state {:?} -> {:?}", self.state, state);
        self.state = state;
        self.history.push(state);
    }

    /// `mlf_core_sync_v{new_version}`.
    pub fn sync_branch(&self) -> String {
        sync_branch_name(&self.new_version)
    }
}

/// What [`BranchSyncEngine::inspect`] gathered before touching anything.
struct Inspection {
    repo: GitRepo,
    metadata: ProjectMetadata,
    project_version: Option<String>,
    blacklist: Blacklist,
}

/// Applies a template update to a project through the `TEMPLATE` branch.
pub struct BranchSyncEngine<'a> {
    renderer: &'a dyn TemplateRenderer,
    pull_requests: Option<&'a dyn PullRequestClient>,
    remote: String,
}

impl<'a> BranchSyncEngine<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, pull_requests: &'a dyn PullRequestClient) -> Self {
        BranchSyncEngine {
            renderer,
            pull_requests: Some(pull_requests),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }

    /// Engine that only commits to the local `TEMPLATE` branch.
    pub fn local(renderer: &'a dyn TemplateRenderer) -> Self {
        BranchSyncEngine { renderer, pull_requests: None, remote: DEFAULT_REMOTE.to_string() }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Re-render the project at template `new_version` on `TEMPLATE`, commit
    /// the changes outside the blacklist, push, and open a pull request.
    /// Projects without a GitHub repository stop after the commit.
    ///
    /// The originally checked-out branch is checked out again on every exit
    /// path once inspection has passed.
    pub fn sync(
        &self,
        project_dir: &Path,
        new_version: &str,
        severity: ChangeSeverity,
    ) -> Result<SyncSession, SyncError> {
        let mut session = SyncSession::new(project_dir, new_version, severity);
        session.advance(SyncState::Inspecting);
        let inspection = self.inspect(project_dir, &mut session)?;

        let result = self.run_steps(&inspection, &mut session);
        self.restore(&inspection.repo, session, result)
    }

    // ---------------------------------------------------------------------
    // Inspecting
    // ---------------------------------------------------------------------

    fn inspect(&self, project_dir: &Path, session: &mut SyncSession) -> Result<Inspection, SyncError> {
        let repo = GitRepo::open(project_dir)?;
        let root = repo.toplevel()?;
        let same_root = match (root.canonicalize(), project_dir.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_root {
            return Err(SyncError::NotARepoRoot { path: project_dir.to_path_buf() });
        }
        if repo.is_dirty()? {
            return Err(SyncError::Dirty { path: project_dir.to_path_buf() });
        }

        let branch = repo.current_branch()?;
        session.original_branch = if branch == "HEAD" { repo.head_oid()? } else { branch };
        tracing::info!("syncing {} from branch {}", project_dir.display(), session.original_branch);

        let metadata = metadata::load(project_dir)?;
        let config = ProjectConfig::load(project_dir)?;
        let blacklist = Blacklist::compile(&config.blacklist_globs()?)?;
        let project_version = config.current_version().ok().map(str::to_string);
        Ok(Inspection { repo, metadata, project_version, blacklist })
    }

    fn run_steps(&self, inspection: &Inspection, session: &mut SyncSession) -> Result<(), SyncError> {
        let repo = &inspection.repo;

        self.checkout_template_branch(repo)?;
        session.advance(SyncState::BranchCheckedOut);

        let root = repo.path();
        remove_all_except(root, &[".git"]).map_err(|e| io_err(root, e))?;
        session.advance(SyncState::FilesWiped);

        self.render_into(root, inspection, &session.new_version)?;
        session.advance(SyncState::Rendered);

        self.commit(inspection, session)?;
        session.advance(SyncState::Committed);
        if !session.made_changes {
            tracing::info!("template contains no changes; nothing to push");
            return Ok(());
        }

        let Some(pull_requests) = self.pull_requests.filter(|_| inspection.metadata.is_github_repo)
        else {
            tracing::info!("no GitHub repository; {TEMPLATE_BRANCH} updated locally only");
            return Ok(());
        };

        let branch = session.sync_branch();
        repo.push_force(&self.remote, TEMPLATE_BRANCH)?;
        repo.create_branch(&branch)?;
        repo.push_branch(&self.remote, &branch)?;
        session.advance(SyncState::Pushed);

        let pr = open_sync_pull_request(pull_requests, &session.new_version)
            .map_err(|source| SyncError::PullRequest { branch, source })?;
        session.pull_request = Some(pr);
        session.advance(SyncState::PullRequestOpened);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Steps
    // ---------------------------------------------------------------------

    fn checkout_template_branch(&self, repo: &GitRepo) -> Result<(), SyncError> {
        let tracking = format!("{}/{TEMPLATE_BRANCH}", self.remote);
        if repo.checkout_new(TEMPLATE_BRANCH, &tracking).is_ok() {
            return Ok(());
        }
        tracing::debug!("no new tracking branch from {tracking}; trying local {TEMPLATE_BRANCH}");
        repo.checkout(TEMPLATE_BRANCH).map_err(|_| SyncError::NoTemplateBranch)
    }

    fn render_into(&self, root: &Path, inspection: &Inspection, new_version: &str) -> Result<(), SyncError> {
        let mut metadata = inspection.metadata.clone();
        metadata.template_version = new_version.to_string();
        // render at the project's current version, not the one it was created with
        if let (Some(version), Some(answer)) =
            (&inspection.project_version, metadata.answers.get_mut("version"))
        {
            *answer = version.clone().into();
        }

        let scratch = tempfile::TempDir::new().map_err(|e| io_err(std::env::temp_dir(), e))?;
        let rendered = self.renderer.render(&metadata, scratch.path())?;
        copy_tree(&rendered, root).map_err(|e| io_err(root, e))?;
        tracing::debug!("copied fresh template from {} into {}", rendered.display(), root.display());
        Ok(())
    }

    fn commit(&self, inspection: &Inspection, session: &mut SyncSession) -> Result<(), SyncError> {
        let repo = &inspection.repo;
        repo.add_all()?;
        let changed = repo.staged_changes()?;
        let partition = inspection.blacklist.partition(&changed);

        for path in &partition.owned {
            tracing::debug!("keeping blacklisted {path}");
            repo.revert_path(path)?;
        }
        if !partition.syncable.is_empty() {
            repo.commit(SYNC_COMMIT_MESSAGE)?;
            session.made_changes = true;
            tracing::info!("committed {} file(s) to {TEMPLATE_BRANCH}", partition.syncable.len());
        }
        // blacklisted files new to the template are still untracked
        repo.remove_untracked()?;

        session.committed = partition.syncable;
        session.kept = partition.owned;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Restored
    // ---------------------------------------------------------------------

    fn restore(
        &self,
        repo: &GitRepo,
        mut session: SyncSession,
        result: Result<(), SyncError>,
    ) -> Result<SyncSession, SyncError> {
        if let Err(err) = &result {
            tracing::warn!("sync aborted: {err}");
            let on_template = session.history.contains(&SyncState::BranchCheckedOut);
            session.advance(SyncState::Aborting);
            if on_template {
                if let Err(e) = repo.discard_changes() {
                    tracing::warn!("could not discard changes on {TEMPLATE_BRANCH}: {e}");
                }
            }
        }

        if let Err(source) = repo.checkout(&session.original_branch) {
            if let Err(err) = &result {
                tracing::error!("sync failed before restoring the original branch: {err}");
            }
            return Err(SyncError::RestoreFailed { branch: session.original_branch, source });
        }
        session.advance(SyncState::Restored);
        result.map(|()| session)
    }
}
