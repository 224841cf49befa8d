//! `mlf-core lint [project_dir]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use super::{print_lint_report, resolve_dir};

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Project root, defaults to the current directory.
    #[arg(default_value = ".")]
    pub project_dir: PathBuf,
}

impl LintArgs {
    pub fn run(self) -> Result<()> {
        let dir = resolve_dir(&self.project_dir)?;
        println!("Linting {}", dir.display().to_string().cyan());
        let report = mlf_core_lint::lint_project(&dir)
            .with_context(|| format!("failed to lint '{}'", dir.display()))?;
        print_lint_report(&report);

        if report.has_failures() {
            bail!("{} lint check(s) failed", report.failed.len());
        }
        Ok(())
    }
}
