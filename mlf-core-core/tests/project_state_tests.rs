//! Identity file, project config and user config integration tests.

use assert_fs::prelude::*;
use mlf_core_core::{
    config::{self, ProjectConfig},
    metadata, user_config, ProjectError, SyncLevel, TemplateHandle, TemplateRegistry,
};
use predicates::prelude::predicate;

const SIDECAR: &str = "\
template_version: 1.0.0 # <<MLF-CORE_NO_BUMP>>
template_handle: mlflow-tensorflow
github_username: grace
creator_github_username: grace
is_github_repo: true
is_repo_private: false
is_github_orga: true
github_orga: navy
project_name: Sea Charts
project_slug: sea-charts
project_slug_no_hyphen: sea_charts
project_short_description: Predicting tides
version: 0.1.0-SNAPSHOT
license: MIT
mlf_core_version: 1.10.0
";

// ---------------------------------------------------------------------------
// 1. Identity file
// ---------------------------------------------------------------------------

#[test]
fn loads_sidecar_written_by_older_releases() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".mlf_core.yml").write_str(SIDECAR).unwrap();

    let meta = metadata::load(dir.path()).expect("load");
    assert_eq!(meta.template_handle, TemplateHandle::from("mlflow-tensorflow"));
    assert_eq!(meta.template_version, "1.0.0");
    assert_eq!(meta.repo_owner(), "navy");
    assert_eq!(meta.answer("license").as_deref(), Some("MIT"));
}

#[test]
fn resave_keeps_free_form_answers_and_annotation() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".mlf_core.yml").write_str(SIDECAR).unwrap();

    let mut meta = metadata::load(dir.path()).unwrap();
    meta.template_version = "1.1.0".to_string();
    metadata::save(dir.path(), &meta).unwrap();

    dir.child(".mlf_core.yml")
        .assert(predicate::str::contains("template_version: 1.1.0 # <<MLF-CORE_NO_BUMP>>"));
    dir.child(".mlf_core.yml")
        .assert(predicate::str::contains("project_short_description: Predicting tides"));
    dir.child(".mlf_core.yml.tmp").assert(predicate::path::missing());
}

#[test]
fn corrupt_sidecar_reports_path() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".mlf_core.yml").write_str("- just\n- a list\n").unwrap();
    let err = metadata::load(dir.path()).unwrap_err();
    assert!(matches!(err, ProjectError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains(".mlf_core.yml"));
}

// ---------------------------------------------------------------------------
// 2. Project config
// ---------------------------------------------------------------------------

#[test]
fn policy_sections_load_from_disk() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("mlf_core.cfg")
        .write_str(
            "[bumpversion]\ncurrent_version = 0.1.0\n\n\
             [sync_level]\nmlf_core_sync_level = patch\n\n\
             [sync_files_blacklisted]\nreadme = README.rst\ngenerated = *.generated\n",
        )
        .unwrap();

    assert_eq!(config::load_sync_level(dir.path()).unwrap(), SyncLevel::Patch);
    let globs = config::load_blacklist_globs(dir.path()).unwrap();
    assert_eq!(globs.patterns(), &["README.rst".to_string(), "*.generated".to_string()]);
}

#[test]
fn missing_policy_is_never_defaulted() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("mlf_core.cfg")
        .write_str("[bumpversion]\ncurrent_version = 0.1.0\n")
        .unwrap();
    let cfg = ProjectConfig::load(dir.path()).unwrap();
    let err = cfg.sync_level().unwrap_err();
    assert!(err.to_string().contains("sync_level"), "got: {err}");
}

// ---------------------------------------------------------------------------
// 3. Registry and user config
// ---------------------------------------------------------------------------

#[test]
fn registry_can_be_loaded_from_a_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("available_templates.yml");
    file.write_str(
        "mlflow:\n  pytorch:\n    name: mlflow-pytorch\n    handle: mlflow-pytorch\n    version: 1.1.0\n",
    )
    .unwrap();
    let reg = TemplateRegistry::load_from_path(file.path()).unwrap();
    assert_eq!(reg.version_of(&TemplateHandle::from("mlflow-pytorch")).unwrap(), "1.1.0");
}

#[test]
fn user_config_lives_under_mlf_core_dir() {
    let dir = assert_fs::TempDir::new().unwrap();
    user_config::set_token_at(dir.path(), "ghp_x").unwrap();
    dir.child("mlf_core/mlf_core_cfg.yml")
        .assert(predicate::str::contains("pat: ghp_x"));
}
