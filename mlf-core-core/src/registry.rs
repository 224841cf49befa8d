//! The template registry (`available_templates.yml`).
//!
//! # Layout
//!
//! ```text
//! <domain>:
//!   <language>:
//!     name / handle / version / short description / long description / available libraries
//!   <language>:
//!     <subdomain>:
//!       name / handle / ...
//! ```
//!
//! The registry ships inside the binary and is read-only at runtime. Template
//! versions only move with mlf-core releases.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::ProjectError;
use crate::types::{TemplateHandle, TemplateRegistryEntry};

const EMBEDDED: &str = include_str!("available_templates.yml");

/// All published templates, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRegistry {
    entries: Vec<TemplateRegistryEntry>,
}

impl TemplateRegistry {
    /// The registry bundled with this build of mlf-core.
    pub fn load() -> Result<Self, ProjectError> {
        Self::from_yaml_str(EMBEDDED)
    }

    /// Load a registry file from disk.
    pub fn load_from_path(path: &Path) -> Result<Self, ProjectError> {
        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_yaml::from_str(&contents)
            .map_err(|e| ProjectError::Parse { path: path.to_path_buf(), source: e })?;
        Self::from_value(value)
    }

    /// Parse registry YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ProjectError> {
        let value: Value = serde_yaml::from_str(contents)?;
        Self::from_value(value)
    }

    /// Build a registry from already-parsed entries.
    pub fn from_entries(entries: Vec<TemplateRegistryEntry>) -> Self {
        TemplateRegistry { entries }
    }

    fn from_value(value: Value) -> Result<Self, ProjectError> {
        let domains = as_mapping(&value, "registry root")?;
        let mut entries = Vec::new();
        for (domain, languages) in domains {
            let domain = key_name(domain);
            for (language, node) in as_mapping(languages, &domain)? {
                let language = key_name(language);
                let node_map = as_mapping(node, &format!("{domain}.{language}"))?;
                if node_map.contains_key("handle") {
                    entries.push(parse_entry(node)?);
                } else {
                    for (_, sub) in node_map {
                        entries.push(parse_entry(sub)?);
                    }
                }
            }
        }
        Ok(TemplateRegistry { entries })
    }

    pub fn entries(&self) -> &[TemplateRegistryEntry] {
        &self.entries
    }

    /// The entry for `handle`, or [`ProjectError::UnknownHandle`].
    pub fn lookup(&self, handle: &TemplateHandle) -> Result<&TemplateRegistryEntry, ProjectError> {
        self.entries
            .iter()
            .find(|e| &e.handle == handle)
            .ok_or_else(|| ProjectError::UnknownHandle { handle: handle.0.clone() })
    }

    /// The currently published version of `handle`.
    pub fn version_of(&self, handle: &TemplateHandle) -> Result<&str, ProjectError> {
        self.lookup(handle).map(|e| e.version.as_str())
    }

    /// Entries whose handle equals `prefix` or starts with `prefix-`.
    pub fn with_prefix(&self, prefix: &str) -> Vec<&TemplateRegistryEntry> {
        self.entries
            .iter()
            .filter(|e| {
                let h = e.handle.0.as_str();
                h == prefix || h.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('-'))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn as_mapping<'a>(value: &'a Value, what: &str) -> Result<&'a Mapping, ProjectError> {
    value.as_mapping().ok_or_else(|| ProjectError::Registry {
        message: format!("expected a mapping at {what}"),
    })
}

fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

fn parse_entry(node: &Value) -> Result<TemplateRegistryEntry, ProjectError> {
    serde_yaml::from_value(node.clone()).map_err(|e| ProjectError::Registry {
        message: format!("invalid template entry: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_registry_has_every_template() {
        let reg = TemplateRegistry::load().expect("embedded registry");
        let handles: Vec<&str> = reg.entries().iter().map(|e| e.handle.0.as_str()).collect();
        assert_eq!(
            handles,
            vec![
                "mlflow-pytorch",
                "mlflow-tensorflow",
                "mlflow-xgboost",
                "mlflow-xgboost_dask",
                "package-prediction"
            ]
        );
        for entry in reg.entries() {
            assert!(crate::version::is_valid(&entry.version), "{} has a bad version", entry.handle);
        }
    }

    #[test]
    fn subdomain_level_is_flattened() {
        let yaml = "\
cli:
  python:
    fast:
      name: cli-python-fast
      handle: cli-python-fast
      version: 2.1.0
      short description: fast
";
        let reg = TemplateRegistry::from_yaml_str(yaml).unwrap();
        let entry = reg.lookup(&TemplateHandle::from("cli-python-fast")).unwrap();
        assert_eq!(entry.version, "2.1.0");
        assert_eq!(entry.short_description, "fast");
    }

    #[test]
    fn unknown_handle_is_an_error() {
        let reg = TemplateRegistry::load().unwrap();
        let err = reg.version_of(&TemplateHandle::from("mlflow-jax")).unwrap_err();
        assert!(matches!(err, ProjectError::UnknownHandle { .. }));
        assert!(err.to_string().contains("mlflow-jax"));
    }

    #[test]
    fn prefix_filter_respects_segments() {
        let reg = TemplateRegistry::load().unwrap();
        assert_eq!(reg.with_prefix("mlflow").len(), 4);
        assert_eq!(reg.with_prefix("mlflow-xgboost").len(), 1);
        assert!(reg.with_prefix("mlf").is_empty());
    }
}
