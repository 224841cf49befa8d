//! Lint freshly rendered projects, then break them one rule at a time.
//!
//! Each `#[case]` gets an isolated `TempDir` and shares no state.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mlf_core_core::types::{ProjectMetadata, TemplateHandle};
use mlf_core_core::ProjectError;
use mlf_core_lint::{lint_before_bump, lint_project, LintError};
use mlf_core_renderer::{Renderer, TemplateRenderer};
use rstest::rstest;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn render(dir: &TempDir, handle: &str) -> PathBuf {
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
    Renderer::new()
        .expect("renderer")
        .render(&meta, dir.path())
        .expect("render")
}

fn edit(path: &Path, from: &str, to: &str) {
    let content = fs::read_to_string(path).expect("read fixture");
    assert!(content.contains(from), "{from:?} not in {}", path.display());
    fs::write(path, content.replacen(from, to, 1)).expect("write fixture");
}

// ---------------------------------------------------------------------------
// Clean projects
// ---------------------------------------------------------------------------

#[rstest]
#[case("mlflow-pytorch")]
#[case("mlflow-tensorflow")]
#[case("mlflow-xgboost")]
#[case("mlflow-xgboost_dask")]
#[case("package-prediction")]
fn fresh_project_is_clean(#[case] handle: &str) {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, handle);

    let report = lint_project(&project).expect("lint");
    assert!(report.failed.is_empty(), "{handle}: {:?}", report.failed);
    assert!(report.warned.is_empty(), "{handle}: {:?}", report.warned);
    assert!(report.passed.iter().any(|r| r.code == "general-6"));
    assert!(report.passed.iter().any(|r| r.code == format!("{handle}-1")));
}

#[test]
fn fresh_project_passes_pre_bump_lint() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "package-prediction");
    assert!(lint_before_bump(&project).is_clean());
}

// ---------------------------------------------------------------------------
// Broken projects
// ---------------------------------------------------------------------------

#[test]
fn missing_identity_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "mlflow-pytorch");
    fs::remove_file(project.join(".mlf_core.yml")).unwrap();

    let err = lint_project(&project).unwrap_err();
    assert!(
        matches!(err, LintError::Project(ProjectError::NotAnMlfCoreProject { .. })),
        "got: {err}"
    );
}

#[test]
fn missing_required_file_fails_general_1() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "mlflow-xgboost");
    fs::remove_file(project.join("docs/usage.rst")).unwrap();
    fs::remove_file(project.join(".gitignore")).unwrap();

    let report = lint_project(&project).unwrap();
    assert!(report.failed.iter().any(|r| r.code == "general-1" && r.message.contains("docs/usage.rst")));
    assert!(report.warned.iter().any(|r| r.code == "general-1" && r.message.contains(".gitignore")));
}

#[test]
fn version_drift_fails_general_5() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "package-prediction");
    edit(&project.join("setup.py"), "version='0.1.0-SNAPSHOT'", "version='0.2.0'");

    let report = lint_project(&project).unwrap();
    let failure = report.failed.iter().find(|r| r.code == "general-5").expect("general-5 failure");
    assert!(failure.message.contains("setup.py"));
    assert!(!report.passed.iter().any(|r| r.code == "general-5"));
}

#[test]
fn no_bump_lines_are_exempt_from_consistency() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "package-prediction");
    edit(
        &project.join("setup.py"),
        "python_requires='>=3.8',",
        "python_requires='>=3.8',  # requires pip 20.0.2 <<MLF-CORE_NO_BUMP>>",
    );
    let report = lint_project(&project).unwrap();
    assert!(!report.failed_with("general-5"), "{:?}", report.failed);
}

#[test]
fn incomplete_mlf_core_py_fails() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "mlflow-pytorch");
    edit(
        &project.join("flower_net/mlf_core/mlf_core.py"),
        "torch.backends.cudnn.benchmark = False",
        "",
    );
    edit(
        &project.join("flower_net/mlf_core/mlf_core.py"),
        "np.random.seed(seed)  # Numpy random",
        "",
    );

    let report = lint_project(&project).unwrap();
    assert!(report.failed_with("mlflow-general-8"));
    assert!(report.failed_with("mlflow-pytorch-2"));
}

#[test]
fn todo_strings_warn_unless_ignored() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "mlflow-tensorflow");
    fs::write(project.join("notes.md"), "<!-- TODO MLF-CORE: describe the data -->\n").unwrap();
    fs::create_dir_all(project.join("mlruns/0")).unwrap();
    fs::write(project.join("mlruns/0/meta.txt"), "TODO MLF-CORE: ignored\n").unwrap();

    let report = lint_project(&project).unwrap();
    let todos: Vec<_> = report.warned.iter().filter(|r| r.code == "general-3").collect();
    assert_eq!(todos.len(), 1, "{todos:?}");
    assert_eq!(todos[0].message, "TODO string found in `notes.md`: describe the data");
}

#[test]
fn leftover_cookiecutter_strings_warn() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "package-prediction");
    fs::write(project.join("notes.txt"), "name: {{ cookiecutter.project_name }}\n").unwrap();

    let report = lint_project(&project).unwrap();
    assert!(report.warned.iter().any(|r| r.code == "general-4"));
}

#[test]
fn broken_changelog_fails_general_6() {
    let dir = TempDir::new().unwrap();
    let project = render(&dir, "mlflow-pytorch");
    edit(&project.join("CHANGELOG.rst"), "**Fixed**", "**Changed**");

    let report = lint_project(&project).unwrap();
    assert!(report.failed_with("general-6"));
}
