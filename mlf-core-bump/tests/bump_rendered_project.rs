//! Bump freshly rendered projects and re-lint them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;
use chrono::NaiveDate;
use mlf_core_bump::{BumpError, ChangelogUpdate, VersionBumper};
use mlf_core_core::types::{ProjectMetadata, TemplateHandle};
use mlf_core_lint::lint_before_bump;
use mlf_core_renderer::{Renderer, TemplateRenderer};
use predicates::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn render(dir: &Path, handle: &str) -> PathBuf {
    let mut answers = BTreeMap::new();
    answers.insert("project_name".to_string(), "Flower Net".into());
    answers.insert("version".to_string(), "0.1.0-SNAPSHOT".into());
    answers.insert("creation_date".to_string(), "2021-05-06".into());
    let meta = ProjectMetadata {
        template_handle: TemplateHandle::from(handle),
        template_version: "1.0.0".to_string(),
        project_slug: "flower-net".to_string(),
        project_slug_no_hyphen: "flower_net".to_string(),
        github_username: "ada".to_string(),
        is_github_repo: false,
        is_repo_private: false,
        is_github_orga: false,
        github_orga: None,
        answers,
    };
    Renderer::new().expect("renderer").render(&meta, dir).expect("render")
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, d).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn release_then_minor_bump_keeps_project_lint_clean() {
    let dir = TempDir::new().unwrap();
    let project = render(dir.path(), "package-prediction");

    let mut bumper = VersionBumper::new(&project, false).unwrap();
    assert_eq!(bumper.current_version(), "0.1.0-SNAPSHOT");
    bumper.can_run("0.1.0").unwrap();
    let outcome = bumper.bump("0.1.0", day(1)).unwrap();
    assert_eq!(outcome.changelog, ChangelogUpdate::SnapshotRenamed);
    assert!(!outcome.committed);
    assert!(outcome.changed_files.contains(&PathBuf::from("setup.py")));

    bumper.can_run("0.2.0").unwrap();
    assert!(bumper.is_usual_bump("0.2.0"));
    let outcome = bumper.bump("0.2.0", day(2)).unwrap();
    assert_eq!(outcome.previous, "0.1.0");
    assert_eq!(outcome.changelog, ChangelogUpdate::SectionAdded);

    let root = assert_fs::fixture::ChildPath::new(project.clone());
    root.child("mlf_core.cfg").assert(predicate::str::is_match(r"current_version\s*=\s*0\.2\.0").unwrap());
    root.child("setup.py").assert(predicate::str::contains("version='0.2.0'"));
    root.child("flower_net/__init__.py").assert(predicate::str::contains("0.2.0"));
    root.child("CHANGELOG.rst")
        .assert(predicate::str::contains("0.2.0 (2021-06-02)\n------------------\n"))
        .assert(predicate::str::contains("0.1.0 (2021-06-01)\n------------------\n"))
        .assert(predicate::str::contains("SNAPSHOT").not());
    // identity file carries the NO_BUMP annotation
    root.child(".mlf_core.yml").assert(predicate::str::contains("template_version: 1.0.0"));

    let report = lint_before_bump(&project);
    assert!(report.is_clean(), "{:?} {:?}", report.failed, report.warned);
}

#[test]
fn bump_commits_in_a_git_repository() {
    let dir = TempDir::new().unwrap();
    let project = render(dir.path(), "mlflow-pytorch");
    run_git(&project, &["init", "-q", "-b", "development"]);
    run_git(&project, &["config", "user.email", "test@example.com"]);
    run_git(&project, &["config", "user.name", "Test User"]);
    run_git(&project, &["add", "-A"]);
    run_git(&project, &["commit", "-q", "-m", "Initial commit"]);

    let mut bumper = VersionBumper::new(&project, false).unwrap();
    let outcome = bumper.bump("0.1.0", day(1)).unwrap();
    assert!(outcome.committed);

    let subject = run_git(&project, &["log", "-1", "--format=%s"]);
    assert_eq!(subject.trim(), "Bump version from 0.1.0-SNAPSHOT to 0.1.0");
    assert!(run_git(&project, &["status", "--porcelain"]).trim().is_empty());
}

#[test]
fn downgrade_leaves_changelog_alone() {
    let dir = TempDir::new().unwrap();
    let project = render(dir.path(), "mlflow-xgboost");
    let before = std::fs::read_to_string(project.join("CHANGELOG.rst")).unwrap();

    let mut bumper = VersionBumper::new(&project, true).unwrap();
    bumper.can_run("0.1.0").unwrap();
    let outcome = bumper.bump("0.1.0", day(1)).unwrap();

    assert_eq!(outcome.changelog, ChangelogUpdate::SkippedDowngrade);
    assert_eq!(std::fs::read_to_string(project.join("CHANGELOG.rst")).unwrap(), before);
}

#[test]
fn missing_changelog_aborts_before_any_write() {
    let dir = TempDir::new().unwrap();
    let project = render(dir.path(), "package-prediction");
    std::fs::remove_file(project.join("CHANGELOG.rst")).unwrap();
    let setup_before = std::fs::read_to_string(project.join("setup.py")).unwrap();

    let mut bumper = VersionBumper::new(&project, false).unwrap();
    let err = bumper.bump("0.1.0", day(1)).unwrap_err();
    assert!(matches!(err, BumpError::MissingChangelog { .. }), "got: {err}");
    assert_eq!(std::fs::read_to_string(project.join("setup.py")).unwrap(), setup_before);
}

#[test]
fn missing_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = VersionBumper::new(dir.path(), false).unwrap_err();
    assert!(err.to_string().contains("mlf_core.cfg"), "got: {err}");
}
