use std::collections::BTreeMap;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

use mlf_core_core::metadata;
use mlf_core_core::types::{ProjectMetadata, TemplateHandle};
use mlf_core_renderer::{RenderError, Renderer, TemplateRenderer};

fn make_metadata(handle: &str) -> ProjectMetadata {
    let mut answers = BTreeMap::new();
    answers.insert("project_name".to_string(), "Flower Net".into());
    answers.insert("full_name".to_string(), "Ada Lovelace".into());
    answers.insert("email".to_string(), "ada@example.com".into());
    answers.insert("version".to_string(), "0.1.0-SNAPSHOT".into());
    answers.insert("creation_date".to_string(), "2021-05-06".into());
    ProjectMetadata {
        template_handle: TemplateHandle::from(handle),
        template_version: "1.0.0".to_string(),
        project_slug: "flower-net".to_string(),
        project_slug_no_hyphen: "flower_net".to_string(),
        github_username: "ada".to_string(),
        is_github_repo: true,
        is_repo_private: false,
        is_github_orga: true,
        github_orga: Some("botany".to_string()),
        answers,
    }
}

#[rstest]
#[case("mlflow-pytorch", "MLproject")]
#[case("mlflow-tensorflow", "environment.yml")]
#[case("mlflow-xgboost", "flower_net/mlf_core/mlf_core.py")]
#[case("mlflow-xgboost_dask", ".github/workflows/train_cpu.yml")]
#[case("package-prediction", "setup.py")]
fn renders_domain_specific_files(#[case] handle: &str, #[case] expected: &str) {
    let out = TempDir::new().unwrap();
    let renderer = Renderer::new().unwrap();
    let project = renderer.render(&make_metadata(handle), out.path()).unwrap();

    assert_eq!(project, out.path().join("flower-net"));
    let root = out.child("flower-net");
    root.child(expected).assert(predicate::path::is_file());
    root.child("README.rst").assert(predicate::str::contains("Flower Net"));
    root.child("Dockerfile").assert(predicate::str::contains("FROM"));
    root.child("mlf_core.cfg").assert(predicate::str::contains("current_version = 0.1.0-SNAPSHOT"));
}

#[test]
fn rendered_identity_file_loads_back() {
    let out = TempDir::new().unwrap();
    let meta = make_metadata("mlflow-pytorch");
    let project = Renderer::new().unwrap().render(&meta, out.path()).unwrap();

    let loaded = metadata::load(&project).unwrap();
    assert_eq!(loaded, meta);
    out.child("flower-net/.mlf_core.yml")
        .assert(predicate::str::contains("template_version: 1.0.0 # <<MLF-CORE_NO_BUMP>>"));
}

#[test]
fn rendered_config_has_sync_policy() {
    let out = TempDir::new().unwrap();
    let project = Renderer::new()
        .unwrap()
        .render(&make_metadata("package-prediction"), out.path())
        .unwrap();

    assert_eq!(
        mlf_core_core::config::load_sync_level(&project).unwrap(),
        mlf_core_core::SyncLevel::Minor
    );
    let globs = mlf_core_core::config::load_blacklist_globs(&project).unwrap();
    assert_eq!(globs.patterns(), &["CHANGELOG.rst".to_string()]);
}

#[test]
fn changelog_starts_with_a_section_for_the_project_version() {
    let out = TempDir::new().unwrap();
    Renderer::new()
        .unwrap()
        .render(&make_metadata("mlflow-pytorch"), out.path())
        .unwrap();

    out.child("flower-net/CHANGELOG.rst").assert(
        predicate::str::contains("=========\nChangelog\n=========")
            .and(predicate::str::contains("0.1.0-SNAPSHOT (2021-05-06)\n---------------------------\n")),
    );
}

#[test]
fn organisation_repos_use_the_orga_as_owner() {
    let out = TempDir::new().unwrap();
    Renderer::new()
        .unwrap()
        .render(&make_metadata("package-prediction"), out.path())
        .unwrap();
    out.child("flower-net/setup.py")
        .assert(predicate::str::contains("https://github.com/botany/flower-net"));
}

#[test]
fn refuses_to_overwrite_existing_project() {
    let out = TempDir::new().unwrap();
    out.child("flower-net/README.rst").write_str("mine").unwrap();

    let err = Renderer::new()
        .unwrap()
        .render(&make_metadata("mlflow-pytorch"), out.path())
        .unwrap_err();
    assert!(matches!(err, RenderError::TargetExists { .. }), "got: {err}");
    out.child("flower-net/README.rst").assert("mine");
}
