//! `mlf-core bump-version <new_version> [project_dir]`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use mlf_core_bump::{ChangelogUpdate, VersionBumper};
use mlf_core_core::ProjectConfig;

use super::{confirm, print_lint_report, resolve_dir};

#[derive(Args, Debug)]
pub struct BumpArgs {
    /// The new version, e.g. `1.2.0` or `1.3.0-SNAPSHOT`.
    #[arg(required_unless_present = "project_version")]
    pub new_version: Option<String>,

    /// Project root, defaults to the current directory.
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,

    /// Allow lower versions; the changelog is left alone.
    #[arg(long)]
    pub downgrade: bool,

    /// Answer yes to every confirmation.
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Print the project's current version and exit. A single positional
    /// argument is then read as the project directory.
    #[arg(long)]
    pub project_version: bool,
}

impl BumpArgs {
    pub fn run(self) -> Result<()> {
        if self.project_version {
            let dir = self.new_version.map(PathBuf::from).unwrap_or(self.project_dir);
            return print_project_version(&resolve_dir(&dir)?);
        }
        let Some(new_version) = self.new_version else {
            bail!("the new version is required");
        };
        let dir = resolve_dir(&self.project_dir)?;
        let new = new_version.trim();

        let mut bumper = VersionBumper::new(&dir, self.downgrade)
            .with_context(|| format!("cannot bump '{}'", dir.display()))?;
        bumper.can_run(new)?;

        let report = mlf_core_lint::lint_before_bump(&dir);
        if !report.is_clean() {
            print_lint_report(&report);
            if !confirm("Lint found problems. Bump anyway?", self.yes)? {
                bail!("bump aborted");
            }
        }
        if !bumper.is_usual_bump(new) {
            let question = format!(
                "{} -> {new} is an unusual version bump. Continue?",
                bumper.current_version()
            );
            if !confirm(&question, self.yes)? {
                bail!("bump aborted");
            }
        }

        let today = chrono::Local::now().date_naive();
        let outcome = bumper
            .bump(new, today)
            .with_context(|| format!("failed to bump '{}' to {new}", dir.display()))?;

        for change in &outcome.line_changes {
            println!("{}", change.file.display().to_string().bold());
            println!("  {}", format!("- {}", change.before.trim()).red());
            println!("  {}", format!("+ {}", change.after.trim()).green());
        }
        match outcome.changelog {
            ChangelogUpdate::SectionAdded => println!("Added a {new} section to CHANGELOG.rst"),
            ChangelogUpdate::SnapshotRenamed => {
                println!("Renamed the {} changelog section to {new}", outcome.previous)
            }
            ChangelogUpdate::SkippedDowngrade => {}
            ChangelogUpdate::HeaderNotFound => println!(
                "{} no {} section in CHANGELOG.rst; add the {new} section by hand",
                "!".yellow(),
                outcome.previous
            ),
        }
        if outcome.committed {
            println!("Committed 'Bump version from {} to {new}'", outcome.previous);
        }
        println!(
            "{} bumped {} from {} to {}",
            "✓".green(),
            dir.display(),
            outcome.previous,
            outcome.new.bold()
        );
        Ok(())
    }
}

fn print_project_version(dir: &Path) -> Result<()> {
    let config = ProjectConfig::load(dir)
        .with_context(|| format!("cannot read the version of '{}'", dir.display()))?;
    println!("{}", config.current_version()?);
    Ok(())
}
