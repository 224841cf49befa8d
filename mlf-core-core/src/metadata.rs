//! The project identity file `.mlf_core.yml`.
//!
//! Written once at creation time and read by every later command. The
//! `template_version` line carries a `# <<MLF-CORE_NO_BUMP>>` annotation so
//! that `bump-version` never rewrites the template version with the
//! project's own version.

use std::path::{Path, PathBuf};

use crate::error::ProjectError;
use crate::fs_util::atomic_write;
use crate::types::ProjectMetadata;

/// File name of the identity sidecar at the project root.
pub const METADATA_FILE: &str = ".mlf_core.yml";

/// Line annotation excluding a line from version bumping.
pub const NO_BUMP_TAG: &str = "<<MLF-CORE_NO_BUMP>>";

/// `<project_dir>/.mlf_core.yml` (pure, no I/O).
pub fn metadata_path(project_dir: &Path) -> PathBuf {
    project_dir.join(METADATA_FILE)
}

/// Returns `true` if `project_dir` contains an identity file.
pub fn is_mlf_core_project(project_dir: &Path) -> bool {
    metadata_path(project_dir).is_file()
}

/// Load the identity record of the project at `project_dir`.
///
/// Returns [`ProjectError::NotAnMlfCoreProject`] if the file is absent and
/// [`ProjectError::Parse`] if it is not a valid record.
pub fn load(project_dir: &Path) -> Result<ProjectMetadata, ProjectError> {
    let path = metadata_path(project_dir);
    if !path.is_file() {
        return Err(ProjectError::NotAnMlfCoreProject { path: project_dir.to_path_buf() });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ProjectError::Parse { path, source: e })
}

/// Atomically write the identity record into `project_dir`.
pub fn save(project_dir: &Path, metadata: &ProjectMetadata) -> Result<(), ProjectError> {
    let yaml = to_yaml(metadata)?;
    atomic_write(&metadata_path(project_dir), yaml.as_bytes())?;
    Ok(())
}

/// Serialize `metadata` the way it is stored on disk, annotation included.
pub fn to_yaml(metadata: &ProjectMetadata) -> Result<String, ProjectError> {
    let raw = serde_yaml::to_string(metadata)?;
    let mut out = String::with_capacity(raw.len() + NO_BUMP_TAG.len() + 3);
    for line in raw.lines() {
        out.push_str(line);
        if line.starts_with("template_version:") {
            out.push_str(" # ");
            out.push_str(NO_BUMP_TAG);
        }
        out.push('\n');
    }
    Ok(out)
}

/// `(project_slug, project_slug_no_hyphen)` for a project name.
///
/// The slug is the lowercased name with spaces and underscores turned into
/// `-`; the second form replaces every `-` with `_` for Python packages.
pub fn slugify(project_name: &str) -> (String, String) {
    let slug: String = project_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect();
    let no_hyphen = slug.replace('-', "_");
    (slug, no_hyphen)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TemplateHandle;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn sample() -> ProjectMetadata {
        let mut answers = BTreeMap::new();
        answers.insert("full_name".to_string(), "Ada Lovelace".into());
        ProjectMetadata {
            template_handle: TemplateHandle::from("mlflow-pytorch"),
            template_version: "1.0.0".to_string(),
            project_slug: "digit-classifier".to_string(),
            project_slug_no_hyphen: "digit_classifier".to_string(),
            github_username: "ada".to_string(),
            is_github_repo: true,
            is_repo_private: false,
            is_github_orga: false,
            github_orga: None,
            answers,
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        save(dir.path(), &sample()).expect("save");
        let loaded = load(dir.path()).expect("load");
        assert_eq!(loaded, sample());
    }

    #[test]
    fn template_version_line_is_annotated() {
        let yaml = to_yaml(&sample()).expect("yaml");
        let line = yaml
            .lines()
            .find(|l| l.starts_with("template_version:"))
            .expect("template_version line");
        assert!(line.ends_with("# <<MLF-CORE_NO_BUMP>>"), "got: {line}");
    }

    #[test]
    fn save_leaves_no_tmp_behind() {
        let dir = TempDir::new().expect("tempdir");
        save(dir.path(), &sample()).expect("save");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), ".tmp must be gone after a successful save");
    }

    #[test]
    fn slugs_from_project_name() {
        assert_eq!(
            slugify(" Digit Classifier_v2 "),
            ("digit-classifier-v2".to_string(), "digit_classifier_v2".to_string())
        );
        assert_eq!(slugify("flower-net").1, "flower_net");
    }

    #[test]
    fn missing_sidecar_is_not_a_project() {
        let dir = TempDir::new().expect("tempdir");
        assert!(!is_mlf_core_project(dir.path()));
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotAnMlfCoreProject { .. }), "got: {err}");
    }
}
