//! File presence and file content checks.

use std::path::Path;

use crate::error::{io_err, LintError};
use crate::report::LintReport;

/// Presence rules for one check code.
///
/// Every inner list of `required` and `recommended` is an OR-group: it is
/// satisfied when any of its paths is a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRules<'a> {
    /// Missing group → failure.
    pub required: &'a [&'a [&'a str]],
    /// Missing group → warning.
    pub recommended: &'a [&'a [&'a str]],
    /// Present path → failure.
    pub forbidden: &'a [&'a str],
    /// Present path → warning.
    pub discouraged: &'a [&'a str],
}

fn wrap_quotes(paths: &[&str]) -> String {
    paths
        .iter()
        .map(|p| format!("`{p}`"))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Check `root` against `rules`, reporting under `code` (`general-1`,
/// `mlflow-pytorch-1`, ...).
///
/// A single "all required files were found" pass is reported when every
/// required group is satisfied.
pub fn check_required_files(root: &Path, code: &str, rules: &FileRules<'_>) -> LintReport {
    let mut report = LintReport::default();
    let exists = |p: &&str| root.join(p).is_file();

    let mut all_found = true;
    for group in rules.required {
        if !group.iter().any(exists) {
            all_found = false;
            report.fail(code, format!("File not found: {}", wrap_quotes(group)));
        }
    }
    if all_found {
        report.pass(code, "All required files were found!");
    }

    for group in rules.recommended {
        if !group.iter().any(exists) {
            report.warn(code, format!("File not found: {}", wrap_quotes(group)));
        }
    }
    for path in rules.forbidden {
        if root.join(path).exists() {
            report.fail(code, format!("File must be removed: `{path}`"));
        }
    }
    for path in rules.discouraged {
        if root.join(path).exists() {
            report.warn(code, format!("File should be removed: `{path}`"));
        }
    }
    report
}

/// Lines of `required_lines` that do not occur in `file`. Both sides are
/// compared after trimming surrounding whitespace.
pub fn missing_lines(file: &Path, required_lines: &[String]) -> Result<Vec<String>, LintError> {
    let content = std::fs::read_to_string(file).map_err(|e| io_err(file, e))?;
    let present: Vec<&str> = content.lines().map(str::trim).collect();
    Ok(required_lines
        .iter()
        .filter(|l| !present.contains(&l.trim()))
        .cloned()
        .collect())
}

/// `true` when every one of `required_lines` occurs in `file`. An
/// unreadable file contains nothing.
pub fn check_content_contains(file: &Path, required_lines: &[String]) -> bool {
    missing_lines(file, required_lines).is_ok_and(|missing| missing.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn or_group_passes_with_any_member() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("LICENCE.md"), "").unwrap();
        let rules = FileRules {
            required: &[&["LICENSE", "LICENSE.md", "LICENCE", "LICENCE.md"]],
            ..FileRules::default()
        };
        let report = check_required_files(dir.path(), "general-1", &rules);
        assert!(report.failed.is_empty());
        assert_eq!(report.passed.len(), 1);
    }

    #[test]
    fn forbidden_directory_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("__pycache__")).unwrap();
        let rules = FileRules { forbidden: &["__pycache__"], ..FileRules::default() };
        let report = check_required_files(dir.path(), "mlflow-xgboost-1", &rules);
        assert_eq!(report.failed[0].message, "File must be removed: `__pycache__`");
    }

    #[test]
    fn content_lines_are_trimmed() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "def f():\n    return 1\n").unwrap();
        assert!(check_content_contains(&file, &["return 1".to_string()]));
        assert!(!check_content_contains(&file, &["return 2".to_string()]));
        assert!(!check_content_contains(&dir.path().join("missing.py"), &[]));
    }
}
