//! `mlf-core sync`: apply a newer template release through a pull request.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use inquire::{Password, PasswordDisplayMode};

use mlf_core_core::git::GitRepo;
use mlf_core_core::user_config;
use mlf_core_core::{metadata, TemplateRegistry};
use mlf_core_renderer::Renderer;
use mlf_core_sync::{pipeline, BranchSyncEngine, GithubClient, SyncOutcome, TEMPLATE_BRANCH};

use super::{confirm, print_lint_report, resolve_dir};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Project root (must be the root of its git repository).
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    /// GitHub personal access token; defaults to the stored one.
    pub pat: Option<String>,

    /// GitHub username; defaults to the configured one.
    pub username: Option<String>,

    /// Only report whether a template update is available.
    #[arg(long)]
    pub check_update: bool,

    /// Store the personal access token and exit.
    #[arg(long)]
    pub set_token: bool,

    /// Sync even when the pre-sync lint fails.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        if self.set_token {
            return store_token(self.pat);
        }

        let dir = resolve_dir(&self.project_dir)?;
        let registry = TemplateRegistry::load().context("failed to load the template registry")?;

        if self.check_update {
            let check = pipeline::check_update(&dir, &registry)
                .with_context(|| format!("update check failed for '{}'", dir.display()))?;
            if check.is_update() {
                println!(
                    "{} template update available: {} -> {} ({})",
                    "!".yellow(),
                    check.recorded,
                    check.published.bold(),
                    check.severity
                );
            } else {
                println!("{} template version {} is up to date", "✓".green(), check.recorded);
            }
            return Ok(());
        }

        let meta = metadata::load(&dir)?;
        let report = mlf_core_lint::lint_project(&dir)
            .with_context(|| format!("failed to lint '{}'", dir.display()))?;
        if report.has_failures() {
            print_lint_report(&report);
            if !confirm("Lint failed. Sync anyway?", self.yes)? {
                bail!("sync aborted");
            }
        }
        warn_about_ignored_files(&dir)?;

        let renderer = Renderer::new().context("failed to load the embedded templates")?;
        let client;
        let engine = if meta.is_github_repo {
            let stored = user_config::load().context("failed to load the user config")?;
            let Some(token) = self.pat.or(stored.pat) else {
                bail!(
                    "no GitHub token: pass one, run `mlf-core config pat` or `mlf-core sync --set-token`"
                );
            };
            let Some(username) = self.username.or(stored.github_username) else {
                bail!("no GitHub username: pass one or run `mlf-core config general`");
            };
            client = GithubClient::for_project(&meta, &username, &token);
            BranchSyncEngine::new(&renderer, &client)
        } else {
            tracing::info!("{} has no GitHub repository; syncing locally", meta.project_slug);
            BranchSyncEngine::local(&renderer)
        };

        let outcome = pipeline::run(&dir, &registry, &engine)
            .with_context(|| format!("sync failed for '{}'", dir.display()))?;
        print_outcome(&outcome);
        Ok(())
    }
}

/// The sync wipes the work tree on `TEMPLATE`; ignored files do not come back.
fn warn_about_ignored_files(dir: &Path) -> Result<()> {
    let ignored = GitRepo::open(dir)
        .and_then(|repo| repo.ignored_paths())
        .with_context(|| format!("cannot inspect '{}'", dir.display()))?;
    if !ignored.is_empty() {
        println!(
            "{} ignored files are deleted if the template changed, back them up first: {}",
            "!".yellow(),
            ignored.join(", ")
        );
    }
    Ok(())
}

fn store_token(pat: Option<String>) -> Result<()> {
    let token = match pat {
        Some(token) => token,
        None => Password::new("GitHub personal access token:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("no token entered")?,
    };
    if token.trim().is_empty() {
        bail!("the personal access token must not be empty");
    }
    user_config::set_token(token.trim()).context("failed to store the token")?;
    println!("{} stored personal access token", "✓".green());
    Ok(())
}

fn print_outcome(outcome: &SyncOutcome) {
    match outcome {
        SyncOutcome::UpToDate(check) => {
            println!("{} template version {} is up to date", "✓".green(), check.recorded);
        }
        SyncOutcome::BelowSyncLevel { check, level } => println!(
            "{} {} update {} -> {} is below the project's sync level '{level}'; nothing to do",
            "·".dimmed(),
            check.severity,
            check.recorded,
            check.published
        ),
        SyncOutcome::Synced { check, session } => {
            if !session.made_changes {
                println!(
                    "{} template {} brings no changes outside the blacklist",
                    "✓".green(),
                    check.published
                );
                return;
            }
            println!(
                "{} committed {} file(s) to TEMPLATE, kept {} blacklisted",
                "✓".green(),
                session.committed.len(),
                session.kept.len()
            );
            match &session.pull_request {
                Some(pr) => println!(
                    "{} opened pull request #{} from {}: {}",
                    "✓".green(),
                    pr.number,
                    session.sync_branch().cyan(),
                    pr.html_url
                ),
                None => println!(
                    "{} merge {} into {} to apply the update",
                    "·".dimmed(),
                    TEMPLATE_BRANCH.cyan(),
                    session.original_branch
                ),
            }
        }
    }
}
