//! Domain types for mlf-core projects.
//!
//! All types that touch disk are serializable via serde + serde_yaml. Key
//! names of [`ProjectMetadata`] are part of the on-disk contract: projects
//! created by older releases must keep loading.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A template handle such as `mlflow-pytorch` (`domain-language`) or
/// `domain-language-subdomain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TemplateHandle(pub String);

impl TemplateHandle {
    /// The domain part (`mlflow` for `mlflow-pytorch`).
    pub fn domain(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }

    /// The language part (`pytorch` for `mlflow-pytorch`), if any.
    pub fn language(&self) -> Option<&str> {
        self.0.split('-').nth(1)
    }
}

impl fmt::Display for TemplateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TemplateHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TemplateHandle {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Ordered glob patterns naming project-owned paths that sync must never
/// overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlacklistGlobSet(pub Vec<String>);

impl BlacklistGlobSet {
    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for BlacklistGlobSet {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Minimum change severity that triggers a sync pull request.
///
/// Variant order matters: `Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncLevel {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for SyncLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncLevel::Patch => write!(f, "patch"),
            SyncLevel::Minor => write!(f, "minor"),
            SyncLevel::Major => write!(f, "major"),
        }
    }
}

impl FromStr for SyncLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "patch" => Ok(SyncLevel::Patch),
            "minor" => Ok(SyncLevel::Minor),
            "major" => Ok(SyncLevel::Major),
            other => Err(format!(
                "unknown sync level '{other}'; expected: patch, minor, major"
            )),
        }
    }
}

/// Classification of a template version change.
///
/// Variant order matters: `None < Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ChangeSeverity {
    #[default]
    None,
    Patch,
    Minor,
    Major,
}

impl ChangeSeverity {
    /// The sync level this severity corresponds to, `None` for no change.
    pub fn as_sync_level(self) -> Option<SyncLevel> {
        match self {
            ChangeSeverity::None => None,
            ChangeSeverity::Patch => Some(SyncLevel::Patch),
            ChangeSeverity::Minor => Some(SyncLevel::Minor),
            ChangeSeverity::Major => Some(SyncLevel::Major),
        }
    }
}

impl fmt::Display for ChangeSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSeverity::None => write!(f, "none"),
            ChangeSeverity::Patch => write!(f, "patch"),
            ChangeSeverity::Minor => write!(f, "minor"),
            ChangeSeverity::Major => write!(f, "major"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Per-project identity record, persisted as `.mlf_core.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub template_handle: TemplateHandle,
    pub template_version: String,
    pub project_slug: String,
    pub project_slug_no_hyphen: String,
    #[serde(default)]
    pub github_username: String,
    #[serde(default)]
    pub is_github_repo: bool,
    #[serde(default, alias = "is_private_repo")]
    pub is_repo_private: bool,
    #[serde(default)]
    pub is_github_orga: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_orga: Option<String>,
    /// Remaining creation-time answers (full_name, email, license, ...).
    #[serde(flatten)]
    pub answers: BTreeMap<String, serde_yaml::Value>,
}

impl ProjectMetadata {
    /// GitHub account owning the repository: the organisation when the
    /// project lives in one, the user otherwise.
    pub fn repo_owner(&self) -> &str {
        match (&self.github_orga, self.is_github_orga) {
            (Some(orga), true) if !orga.is_empty() => orga,
            _ => &self.github_username,
        }
    }

    /// A free-form answer rendered as a string, if present and scalar.
    pub fn answer(&self, key: &str) -> Option<String> {
        match self.answers.get(key)? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One published template variant from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRegistryEntry {
    pub name: String,
    pub handle: TemplateHandle,
    pub version: String,
    #[serde(rename = "short description", default)]
    pub short_description: String,
    #[serde(rename = "long description", default)]
    pub long_description: String,
    #[serde(rename = "available libraries", default)]
    pub available_libraries: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_parts() {
        let h = TemplateHandle::from("mlflow-xgboost_dask");
        assert_eq!(h.domain(), "mlflow");
        assert_eq!(h.language(), Some("xgboost_dask"));
        assert_eq!(h.to_string(), "mlflow-xgboost_dask");
    }

    #[test]
    fn sync_level_ordering() {
        assert!(SyncLevel::Patch < SyncLevel::Minor);
        assert!(SyncLevel::Minor < SyncLevel::Major);
    }

    #[test]
    fn sync_level_parse_rejects_unknown() {
        assert_eq!("minor".parse::<SyncLevel>(), Ok(SyncLevel::Minor));
        assert!("huge".parse::<SyncLevel>().is_err());
    }

    #[test]
    fn severity_none_has_no_level() {
        assert_eq!(ChangeSeverity::None.as_sync_level(), None);
        assert_eq!(ChangeSeverity::Major.as_sync_level(), Some(SyncLevel::Major));
        assert!(ChangeSeverity::None < ChangeSeverity::Patch);
    }

    #[test]
    fn repo_owner_prefers_orga() {
        let yaml = "template_handle: mlflow-pytorch\ntemplate_version: 1.0.0\n\
                    project_slug: demo\nproject_slug_no_hyphen: demo\n\
                    github_username: alice\nis_github_orga: true\ngithub_orga: acme\n";
        let meta: ProjectMetadata = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(meta.repo_owner(), "acme");

        let solo = ProjectMetadata { is_github_orga: false, ..meta };
        assert_eq!(solo.repo_owner(), "alice");
    }

    #[test]
    fn unknown_keys_are_kept_as_answers() {
        let yaml = "template_handle: mlflow-pytorch\ntemplate_version: 1.0.0\n\
                    project_slug: demo\nproject_slug_no_hyphen: demo\n\
                    full_name: Alice\nversion: 0.1.0-SNAPSHOT\n";
        let meta: ProjectMetadata = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(meta.answer("full_name").as_deref(), Some("Alice"));
        assert_eq!(meta.answer("version").as_deref(), Some("0.1.0-SNAPSHOT"));
    }
}
