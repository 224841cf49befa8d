//! Project linting for mlf-core.
//!
//! `lint_project(path)` runs the general check table followed by the table
//! of the project's template and returns every finding. Only a missing or
//! unreadable `.mlf_core.yml` (or a handle without a table) aborts the run;
//! all other problems are accumulated in the [`LintReport`].

use std::path::Path;

pub mod changelog;
pub mod checks;
pub mod domains;
pub mod error;
pub mod files;
pub mod report;

pub use changelog::ChangelogLinter;
pub use checks::LintContext;
pub use domains::{checks_for, CheckDescriptor, GENERAL_CHECKS};
pub use error::LintError;
pub use files::{check_content_contains, check_required_files, FileRules};
pub use report::{LintReport, LintResult};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lint the project at `project_dir` with the general and template checks.
pub fn lint_project(project_dir: &Path) -> Result<LintReport, LintError> {
    let ctx = LintContext::load(project_dir)?;
    let mut report = LintReport::default();

    tracing::info!("running general linting for {}", project_dir.display());
    run_checks(&ctx, GENERAL_CHECKS, &mut report)?;
    tracing::info!("running {} linting", ctx.kind.handle());
    run_checks(&ctx, checks_for(ctx.kind), &mut report)?;

    tracing::debug!(
        "lint finished: {} passed, {} warned, {} failed",
        report.passed.len(),
        report.warned.len(),
        report.failed.len()
    );
    Ok(report)
}

/// The subset run before a version bump: changelog layout and version
/// consistency. Needs no identity file.
pub fn lint_before_bump(project_dir: &Path) -> LintReport {
    let mut report = checks::lint_changelog_at(project_dir);
    report.merge(checks::check_version_consistent(project_dir));
    report
}

fn run_checks(
    ctx: &LintContext,
    table: &[CheckDescriptor],
    report: &mut LintReport,
) -> Result<(), LintError> {
    for descriptor in table {
        tracing::debug!("lint check {}", descriptor.name);
        (descriptor.run)(ctx, report)?;
    }
    Ok(())
}
