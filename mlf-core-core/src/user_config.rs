//! Per-user settings (`<config_dir>/mlf_core/mlf_core_cfg.yml`).
//!
//! Holds the default answers used when creating projects and the GitHub
//! personal access token used by `sync`.
//!
//! # API pattern
//!
//! - `fn_at(config_dir: &Path, …)`: explicit base directory; used in tests
//! - `fn(…)`: derives it from `dirs::config_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::fs_util::{atomic_write, set_private_permissions};

/// Stored user settings. Every field is optional so a partially configured
/// file still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,
    /// GitHub personal access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pat: Option<String>,
}

/// `<config_dir>/mlf_core/mlf_core_cfg.yml` (pure, no I/O).
pub fn user_config_path_at(config_dir: &Path) -> PathBuf {
    config_dir.join("mlf_core").join("mlf_core_cfg.yml")
}

/// `user_config_path_at` for the current user.
pub fn user_config_path() -> Result<PathBuf, ProjectError> {
    Ok(user_config_path_at(&config_dir()?))
}

/// Load the user config; a missing file yields the default (empty) config.
pub fn load_at(config_dir: &Path) -> Result<UserConfig, ProjectError> {
    let path = user_config_path_at(config_dir);
    if !path.exists() {
        return Ok(UserConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Ok(UserConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ProjectError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<UserConfig, ProjectError> {
    load_at(&config_dir()?)
}

/// Atomically save the user config with owner-only permissions.
pub fn save_at(config_dir: &Path, config: &UserConfig) -> Result<(), ProjectError> {
    let path = user_config_path_at(config_dir);
    let yaml = serde_yaml::to_string(config)?;
    atomic_write(&path, yaml.as_bytes())?;
    set_private_permissions(&path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &UserConfig) -> Result<(), ProjectError> {
    save_at(&config_dir()?, config)
}

/// Store a new personal access token, keeping the other settings.
pub fn set_token_at(config_dir: &Path, token: &str) -> Result<(), ProjectError> {
    let mut config = load_at(config_dir)?;
    config.pat = Some(token.to_string());
    save_at(config_dir, &config)
}

/// `set_token_at` convenience wrapper.
pub fn set_token(token: &str) -> Result<(), ProjectError> {
    set_token_at(&config_dir()?, token)
}

fn config_dir() -> Result<PathBuf, ProjectError> {
    dirs::config_dir().ok_or(ProjectError::ConfigDirNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_at(dir.path()).unwrap(), UserConfig::default());
    }

    #[test]
    fn set_token_keeps_other_fields() {
        let dir = TempDir::new().unwrap();
        let cfg = UserConfig {
            full_name: Some("Ada".into()),
            github_username: Some("ada".into()),
            ..UserConfig::default()
        };
        save_at(dir.path(), &cfg).unwrap();
        set_token_at(dir.path(), "ghp_secret").unwrap();

        let loaded = load_at(dir.path()).unwrap();
        assert_eq!(loaded.full_name.as_deref(), Some("Ada"));
        assert_eq!(loaded.pat.as_deref(), Some("ghp_secret"));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        set_token_at(dir.path(), "t").unwrap();
        let mode = std::fs::metadata(user_config_path_at(dir.path()))
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600);
    }
}
