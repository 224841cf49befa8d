//! The project build/version config file `mlf_core.cfg` (INI).
//!
//! # Sections
//!
//! ```text
//! [bumpversion]
//! current_version = 0.1.0-SNAPSHOT
//!
//! [bumpversion_files_whitelisted]      name = relative path, every version is bumped
//! [bumpversion_files_blacklisted]      name = relative path, only FORCE_BUMP lines
//!
//! [sync_level]
//! mlf_core_sync_level = minor          exactly one key containing "sync_level"
//!
//! [sync_files_blacklisted]             name = glob, never overwritten by sync
//! ```
//!
//! Sync policy sections are never defaulted: a missing or malformed section
//! is a [`ProjectError::Config`], so a typo cannot silently let sync
//! overwrite project-owned files.

use std::path::{Path, PathBuf};

use ini::Ini;

use crate::error::ProjectError;
use crate::fs_util::atomic_write;
use crate::types::{BlacklistGlobSet, SyncLevel};

/// File name of the project config at the project root.
pub const CONFIG_FILE: &str = "mlf_core.cfg";

pub const SECTION_BUMPVERSION: &str = "bumpversion";
pub const SECTION_WHITELISTED: &str = "bumpversion_files_whitelisted";
pub const SECTION_BLACKLISTED: &str = "bumpversion_files_blacklisted";
pub const SECTION_SYNC_LEVEL: &str = "sync_level";
pub const SECTION_SYNC_BLACKLIST: &str = "sync_files_blacklisted";

/// Which bumpversion section a file is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpSection {
    /// Every version on every line is bumped unless tagged NO_BUMP.
    Whitelisted,
    /// Only lines tagged FORCE_BUMP are bumped.
    Blacklisted,
}

impl BumpSection {
    pub fn section_name(self) -> &'static str {
        match self {
            BumpSection::Whitelisted => SECTION_WHITELISTED,
            BumpSection::Blacklisted => SECTION_BLACKLISTED,
        }
    }
}

/// A file taking part in version bumping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpFile {
    pub section: BumpSection,
    /// Path relative to the project root.
    pub path: PathBuf,
}

/// `<project_dir>/mlf_core.cfg` (pure, no I/O).
pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE)
}

/// A loaded `mlf_core.cfg`.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    path: PathBuf,
    ini: Ini,
}

impl ProjectConfig {
    /// Load `mlf_core.cfg` from `project_dir`.
    pub fn load(project_dir: &Path) -> Result<Self, ProjectError> {
        let path = config_path(project_dir);
        if !path.is_file() {
            return Err(ProjectError::MissingConfig { path });
        }
        let ini = Ini::load_from_file(&path).map_err(|e| ProjectError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(ProjectConfig { path, ini })
    }

    /// Parse config text; `path` is only used in error messages and by [`save`](Self::save).
    pub fn from_str_at(path: impl Into<PathBuf>, contents: &str) -> Result<Self, ProjectError> {
        let path = path.into();
        let ini = Ini::load_from_str(contents).map_err(|e| ProjectError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(ProjectConfig { path, ini })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn config_err(&self, message: impl Into<String>) -> ProjectError {
        ProjectError::Config { path: self.path.clone(), message: message.into() }
    }

    /// `[bumpversion] current_version`.
    pub fn current_version(&self) -> Result<&str, ProjectError> {
        self.ini
            .section(Some(SECTION_BUMPVERSION))
            .and_then(|s| s.get("current_version"))
            .map(str::trim)
            .ok_or_else(|| self.config_err("missing [bumpversion] current_version"))
    }

    /// Set `[bumpversion] current_version` in memory; call [`save`](Self::save) to persist.
    pub fn set_current_version(&mut self, version: &str) {
        self.ini
            .with_section(Some(SECTION_BUMPVERSION))
            .set("current_version", version);
    }

    /// All files listed in the two bumpversion sections, whitelisted first.
    /// A missing section contributes no files.
    pub fn bump_files(&self) -> Vec<BumpFile> {
        let mut files = Vec::new();
        for section in [BumpSection::Whitelisted, BumpSection::Blacklisted] {
            if let Some(props) = self.ini.section(Some(section.section_name())) {
                for (_, value) in props.iter() {
                    files.push(BumpFile { section, path: PathBuf::from(value.trim()) });
                }
            }
        }
        files
    }

    /// The project's sync level policy.
    ///
    /// The `[sync_level]` section must hold exactly one item whose key
    /// contains `sync_level` and whose value is `patch`, `minor` or `major`.
    pub fn sync_level(&self) -> Result<SyncLevel, ProjectError> {
        let props = self
            .ini
            .section(Some(SECTION_SYNC_LEVEL))
            .ok_or_else(|| self.config_err("missing [sync_level] section"))?;
        let items: Vec<(&str, &str)> = props.iter().collect();
        match items.as_slice() {
            [(key, value)] if key.contains("sync_level") => value
                .parse::<SyncLevel>()
                .map_err(|msg| self.config_err(format!("[sync_level] {key}: {msg}"))),
            _ => Err(self.config_err(
                "[sync_level] must contain exactly one item named like \
                 mlf_core_sync_level with a value of patch, minor or major",
            )),
        }
    }

    /// The ordered glob patterns of `[sync_files_blacklisted]`.
    pub fn blacklist_globs(&self) -> Result<BlacklistGlobSet, ProjectError> {
        let props = self
            .ini
            .section(Some(SECTION_SYNC_BLACKLIST))
            .ok_or_else(|| self.config_err("missing [sync_files_blacklisted] section"))?;
        let globs = props
            .iter()
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>();
        Ok(BlacklistGlobSet(globs))
    }

    /// Atomically write the config back to the file it was loaded from.
    pub fn save(&self) -> Result<(), ProjectError> {
        let mut buf = Vec::new();
        self.ini.write_to(&mut buf)?;
        atomic_write(&self.path, &buf)?;
        Ok(())
    }
}

/// `ProjectConfig::load(dir)?.sync_level()` convenience wrapper.
pub fn load_sync_level(project_dir: &Path) -> Result<SyncLevel, ProjectError> {
    ProjectConfig::load(project_dir)?.sync_level()
}

/// `ProjectConfig::load(dir)?.blacklist_globs()` convenience wrapper.
pub fn load_blacklist_globs(project_dir: &Path) -> Result<BlacklistGlobSet, ProjectError> {
    ProjectConfig::load(project_dir)?.blacklist_globs()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
