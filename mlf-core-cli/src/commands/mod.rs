pub mod bump;
pub mod config;
pub mod create;
pub mod fix_artifact_paths;
pub mod info;
pub mod lint;
pub mod list;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use inquire::Confirm;

use mlf_core_lint::{LintReport, LintResult};

/// Canonical form of a user-supplied project directory.
pub(crate) fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    dir.canonicalize()
        .with_context(|| format!("cannot resolve path '{}'", dir.display()))
}

/// Ask a yes/no question; `assume_yes` answers it without prompting.
pub(crate) fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Confirm::new(question)
        .with_default(false)
        .prompt()
        .with_context(|| format!("no answer to '{question}' (pass --yes to skip prompts)"))
}

pub(crate) fn print_lint_report(report: &LintReport) {
    print_section("Failed", &report.failed, |s| s.red());
    print_section("Warnings", &report.warned, |s| s.yellow());

    println!(
        "{} passed, {} warnings, {} failed",
        report.passed.len().to_string().green(),
        report.warned.len().to_string().yellow(),
        report.failed.len().to_string().red(),
    );
}

fn print_section(title: &str, results: &[LintResult], paint: fn(&str) -> ColoredString) {
    if results.is_empty() {
        return;
    }
    println!("{}", paint(title).bold());
    for result in results {
        println!("  {} {}", paint(&result.code), result.message);
    }
}
