//! Local MLflow tracking stores (`mlruns/`).
//!
//! MLflow records absolute `file://` artifact locations in every
//! `meta.yaml`. Once a project is moved or copied they point at the old
//! place, and the MLflow UI cannot find the artifacts.

use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use walkdir::WalkDir;

use crate::error::ProjectError;
use crate::fs_util::atomic_write;

pub const MLRUNS_DIR: &str = "mlruns";

/// Key of an experiment's artifact root.
pub const EXPERIMENT_KEY: &str = "artifact_location";
/// Key of a run's artifact directory.
pub const RUN_KEY: &str = "artifact_uri";

/// What happened to one `meta.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactPathFix {
    /// The location was rewritten to point below the file's directory.
    Rewritten { meta_yaml: PathBuf, key: &'static str, location: String },
    /// The artifacts are not stored on the local file system.
    NotLocal { meta_yaml: PathBuf, location: String },
}

/// Point every `artifact_location` and `artifact_uri` under
/// `<root>/mlruns` at the directory its `meta.yaml` lives in.
///
/// Files that already hold the right location are left alone and not
/// reported.
pub fn fix_artifact_paths(root: &Path) -> Result<Vec<ArtifactPathFix>, ProjectError> {
    let mlruns = root.join(MLRUNS_DIR);
    if !mlruns.is_dir() {
        return Err(ProjectError::NoTrackingStore { path: mlruns });
    }

    let mut fixes = Vec::new();
    for entry in WalkDir::new(&mlruns).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_file() && entry.file_name() == "meta.yaml" {
            fixes.extend(fix_meta_yaml(entry.path())?);
        }
    }
    Ok(fixes)
}

fn fix_meta_yaml(path: &Path) -> Result<Option<ArtifactPathFix>, ProjectError> {
    let contents = std::fs::read_to_string(path)?;
    let mut meta: Mapping = serde_yaml::from_str(&contents)
        .map_err(|source| ProjectError::Parse { path: path.to_path_buf(), source })?;

    let (key, suffix) = if meta.contains_key(EXPERIMENT_KEY) {
        (EXPERIMENT_KEY, "")
    } else if meta.contains_key(RUN_KEY) {
        (RUN_KEY, "/artifacts")
    } else {
        return Ok(None);
    };

    let current = meta.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
    if !current.is_empty() && !current.starts_with("file:") && !current.starts_with('/') {
        return Ok(Some(ArtifactPathFix::NotLocal { meta_yaml: path.to_path_buf(), location: current }));
    }

    let dir = path.parent().unwrap_or(path).canonicalize()?;
    let location = format!("file://{}{suffix}", dir.display());
    if current == location {
        return Ok(None);
    }

    meta.insert(Value::from(key), Value::from(location.clone()));
    atomic_write(path, serde_yaml::to_string(&meta)?.as_bytes())?;
    Ok(Some(ArtifactPathFix::Rewritten { meta_yaml: path.to_path_buf(), key, location }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn store() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "mlruns/0/meta.yaml",
            "artifact_location: file:///old/place/mlruns/0\nexperiment_id: '0'\nname: Default\n",
        );
        write(
            dir.path(),
            "mlruns/0/abc123/meta.yaml",
            "artifact_uri: file:///old/place/mlruns/0/abc123/artifacts\nrun_id: abc123\nstatus: 3\n",
        );
        dir
    }

    #[test]
    fn experiment_and_run_locations_follow_the_store() {
        let dir = store();
        let fixes = fix_artifact_paths(dir.path()).unwrap();
        assert_eq!(fixes.len(), 2);

        let here = dir.path().canonicalize().unwrap();
        let experiment = std::fs::read_to_string(dir.path().join("mlruns/0/meta.yaml")).unwrap();
        assert!(
            experiment.contains(&format!("artifact_location: file://{}/mlruns/0\n", here.display())),
            "{experiment}"
        );
        assert!(experiment.contains("experiment_id: '0'"), "{experiment}");

        let run = std::fs::read_to_string(dir.path().join("mlruns/0/abc123/meta.yaml")).unwrap();
        assert!(
            run.contains(&format!("artifact_uri: file://{}/mlruns/0/abc123/artifacts", here.display())),
            "{run}"
        );
        assert!(run.contains("status: 3"), "{run}");

        // second pass finds nothing to do
        assert!(fix_artifact_paths(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn remote_artifacts_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "mlruns/1/meta.yaml", "artifact_location: s3://bucket/1\nname: remote\n");

        let fixes = fix_artifact_paths(dir.path()).unwrap();
        assert_eq!(
            fixes,
            vec![ArtifactPathFix::NotLocal { meta_yaml: path.clone(), location: "s3://bucket/1".into() }]
        );
        assert!(std::fs::read_to_string(path).unwrap().contains("s3://bucket/1"));
    }

    #[test]
    fn missing_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = fix_artifact_paths(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NoTrackingStore { .. }), "{err}");
    }
}
