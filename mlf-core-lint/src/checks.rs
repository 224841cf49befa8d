//! Checks shared by every template (`general-*`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use walkdir::WalkDir;

use mlf_core_core::config::{BumpSection, ProjectConfig, CONFIG_FILE};
use mlf_core_core::metadata::{self, NO_BUMP_TAG};
use mlf_core_core::types::ProjectMetadata;
use mlf_core_core::version;
use mlf_core_renderer::TemplateKind;

use crate::changelog::ChangelogLinter;
use crate::error::{io_err, LintError};
use crate::files::{check_required_files, FileRules};
use crate::report::LintReport;

/// Line annotation forcing a bump inside a blacklisted file.
pub const FORCE_BUMP_TAG: &str = "<<MLF-CORE_FORCE_BUMP>>";

const TODO_MARKERS: [&str; 2] = ["TODO MLF-CORE:", "MLF-CORE TODO:"];

/// Everything a check needs to know about the project under lint.
#[derive(Debug, Clone)]
pub struct LintContext {
    pub root: PathBuf,
    pub metadata: ProjectMetadata,
    pub kind: TemplateKind,
}

impl LintContext {
    /// Load the identity file of the project at `root`.
    pub fn load(root: &Path) -> Result<Self, LintError> {
        let metadata = metadata::load(root)?;
        let kind = TemplateKind::from_handle(&metadata.template_handle).map_err(|_| {
            LintError::NoLinter { handle: metadata.template_handle.0.clone() }
        })?;
        Ok(LintContext { root: root.to_path_buf(), metadata, kind })
    }

    /// `<root>/<project_slug_no_hyphen>/<rel>`.
    pub fn package_path(&self, rel: &str) -> PathBuf {
        self.root.join(&self.metadata.project_slug_no_hyphen).join(rel)
    }
}

// ---------------------------------------------------------------------------
// general-1
// ---------------------------------------------------------------------------

pub fn files_exist(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    let rules = FileRules {
        required: &[
            &["Dockerfile"],
            &[CONFIG_FILE],
            &["README.rst"],
            &["CHANGELOG.rst"],
            &["LICENSE", "LICENSE.md", "LICENCE", "LICENCE.md"],
            &["docs/index.rst"],
            &["docs/readme.rst"],
            &["docs/changelog.rst"],
            &["docs/usage.rst"],
        ],
        recommended: &[
            &[".gitignore"],
            &[".github/ISSUE_TEMPLATE/bug_report.md"],
            &[".github/ISSUE_TEMPLATE/feature_request.md"],
            &[".github/ISSUE_TEMPLATE/general_question.md"],
            &[".github/pull_request_template.md"],
        ],
        ..FileRules::default()
    };
    report.merge(check_required_files(&ctx.root, "general-1", &rules));
    Ok(())
}

// ---------------------------------------------------------------------------
// general-2
// ---------------------------------------------------------------------------

pub fn docker(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    let content = std::fs::read_to_string(ctx.root.join("Dockerfile")).unwrap_or_default();
    if content.contains("FROM") {
        report.pass("general-2", "Dockerfile check passed");
    } else {
        report.fail("general-2", "Dockerfile check failed");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// general-3 / general-4: text scans
// ---------------------------------------------------------------------------

/// Names never scanned: `.git` plus the basename of every `.gitignore` entry.
fn ignored_names(root: &Path) -> HashSet<String> {
    let mut names = HashSet::from([".git".to_string()]);
    if let Ok(content) = std::fs::read(root.join(".gitignore")) {
        for line in String::from_utf8_lossy(&content).lines() {
            let entry = line.trim().trim_end_matches('/');
            if let Some(base) = Path::new(entry).file_name() {
                names.insert(base.to_string_lossy().into_owned());
            }
        }
    }
    names
}

/// Every `(file name, line)` of the text files under `root`, skipping `ignore`.
fn scan_lines(
    root: &Path,
    ignore: &HashSet<String>,
    mut visit: impl FnMut(&str, &str),
) -> Result<(), LintError> {
    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !ignore.contains(&*e.file_name().to_string_lossy()));
    for entry in walker {
        let entry = entry.map_err(|e| io_err(root, e.into()))?;
        if !entry.file_type().is_file() || entry.path().extension().is_some_and(|x| x == "pyc") {
            continue;
        }
        let bytes = std::fs::read(entry.path()).map_err(|e| io_err(entry.path(), e))?;
        let name = entry.file_name().to_string_lossy();
        for line in String::from_utf8_lossy(&bytes).lines() {
            visit(&name[..], line);
        }
    }
    Ok(())
}

pub fn todos(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    let ignore = ignored_names(&ctx.root);
    scan_lines(&ctx.root, &ignore, |name, line| {
        if TODO_MARKERS.iter().any(|m| line.contains(m)) {
            let mut text = line.replace("<!--", "").replace("-->", "");
            for prefix in ["# ", "// ", ""] {
                for marker in TODO_MARKERS {
                    text = text.replace(&format!("{prefix}{marker} "), "");
                }
            }
            report.warn("general-3", format!("TODO string found in `{name}`: {}", text.trim()));
        }
    })
}

fn cookiecutter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\s?.* cookiecutter.*\s?\}")
            .unwrap_or_else(|e| unreachable!("cookiecutter pattern is a valid regex: {e}"))
    })
}

pub fn no_cookiecutter_strings(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    let ignore = HashSet::from([".git".to_string()]);
    scan_lines(&ctx.root, &ignore, |name, line| {
        if cookiecutter_re().is_match(line) {
            let keep = 50usize.saturating_sub(name.chars().count());
            let excerpt: String = line.chars().take(keep).collect();
            report.warn("general-4", format!("Cookiecutter string found in '{name}': {excerpt}.."));
        }
    })
}

// ---------------------------------------------------------------------------
// general-5: version consistency
// ---------------------------------------------------------------------------

/// Whether a line of a bump file is subject to version bumping.
pub fn line_is_bumpable(section: BumpSection, line: &str) -> bool {
    line.contains(FORCE_BUMP_TAG)
        || (section == BumpSection::Whitelisted && !line.contains(NO_BUMP_TAG))
}

/// Check that every bumpable version in the bumpversion files equals
/// `current_version`.
pub fn check_version_consistent(root: &Path) -> LintReport {
    const CODE: &str = "general-5";
    let mut report = LintReport::default();
    let config = match ProjectConfig::load(root) {
        Ok(c) => c,
        Err(e) => {
            report.fail(CODE, e.to_string());
            return report;
        }
    };
    let current = match config.current_version() {
        Ok(v) => v.to_string(),
        Err(e) => {
            report.fail(CODE, e.to_string());
            return report;
        }
    };

    for file in config.bump_files() {
        let path = root.join(&file.path);
        let Ok(content) = std::fs::read_to_string(&path) else {
            report.fail(CODE, format!("File listed in {CONFIG_FILE} not found: {}", file.path.display()));
            continue;
        };
        for line in content.lines().filter(|l| line_is_bumpable(file.section, l)) {
            if let Some(found) = version::first_version(line) {
                if found != current {
                    let corrected = version::replace_versions(line, &current);
                    report.fail(
                        CODE,
                        format!(
                            "Version number don't match in {}: {} should be {}",
                            file.path.display(),
                            line.trim(),
                            corrected.trim()
                        ),
                    );
                }
            }
        }
    }
    if !report.failed_with(CODE) {
        report.pass(CODE, "Versions were consistent over all files");
    }
    report
}

pub fn version_consistent(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    report.merge(check_version_consistent(&ctx.root));
    Ok(())
}

// ---------------------------------------------------------------------------
// general-6: changelog
// ---------------------------------------------------------------------------

/// Lint `<root>/CHANGELOG.rst`; a missing file is a failure.
pub fn lint_changelog_at(root: &Path) -> LintReport {
    match std::fs::read_to_string(root.join("CHANGELOG.rst")) {
        Ok(content) => ChangelogLinter::new(&content).lint(),
        Err(_) => {
            let mut report = LintReport::default();
            report.fail(
                crate::changelog::CODE,
                format!("No file named CHANGELOG.rst found at {}", root.display()),
            );
            report
        }
    }
}

pub fn changelog(ctx: &LintContext, report: &mut LintReport) -> Result<(), LintError> {
    report.merge(lint_changelog_at(&ctx.root));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumpable_lines() {
        assert!(line_is_bumpable(BumpSection::Whitelisted, "version = '1.0.0'"));
        assert!(!line_is_bumpable(BumpSection::Whitelisted, "v: 1.0.0 # <<MLF-CORE_NO_BUMP>>"));
        assert!(!line_is_bumpable(BumpSection::Blacklisted, "version = '1.0.0'"));
        assert!(line_is_bumpable(BumpSection::Blacklisted, "v: 1.0.0 # <<MLF-CORE_FORCE_BUMP>>"));
    }

    #[test]
    fn gitignore_basenames_are_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "build/\nmlruns/\n").unwrap();
        let names = ignored_names(dir.path());
        assert!(names.contains(".git"));
        assert!(names.contains("build"));
        assert!(names.contains("mlruns"));
    }

    #[test]
    fn cookiecutter_pattern() {
        assert!(cookiecutter_re().is_match("name = {{ cookiecutter.project_slug }}"));
        assert!(!cookiecutter_re().is_match("name = {{ project_slug }}"));
    }
}
