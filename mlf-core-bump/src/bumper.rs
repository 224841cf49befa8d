//! The version bumper.
//!
//! A bump rewrites every version token on the bumpable lines of the files
//! listed in `mlf_core.cfg`, updates `current_version`, adds (or renames) a
//! changelog section, and commits the result when the project is a git
//! repository.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use mlf_core_core::config::{BumpSection, ProjectConfig, CONFIG_FILE};
use mlf_core_core::fs_util::atomic_write;
use mlf_core_core::git::{self, GitRepo};
use mlf_core_core::version::{self, Version};
use mlf_core_lint::checks::line_is_bumpable;

use crate::changelog::{self, CHANGELOG_FILE};
use crate::error::{io_err, BumpError};

/// One rewritten line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// Path relative to the project root.
    pub file: PathBuf,
    pub before: String,
    pub after: String,
}

/// What happened to `CHANGELOG.rst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangelogUpdate {
    /// A new empty section was inserted above the previous one.
    SectionAdded,
    /// The SNAPSHOT section was renamed to the release.
    SnapshotRenamed,
    /// Downgrades never touch the changelog.
    SkippedDowngrade,
    /// No section header for the current version was found.
    HeaderNotFound,
}

/// Result of [`VersionBumper::bump`].
#[derive(Debug, Clone)]
pub struct BumpOutcome {
    pub previous: String,
    pub new: String,
    pub line_changes: Vec<LineChange>,
    /// Relative paths of every file written, config and changelog included.
    pub changed_files: Vec<PathBuf>,
    pub changelog: ChangelogUpdate,
    pub committed: bool,
}

/// Bumps the version of the project at `project_dir`.
#[derive(Debug)]
pub struct VersionBumper {
    project_dir: PathBuf,
    config: ProjectConfig,
    current: String,
    downgrade: bool,
}

impl VersionBumper {
    /// Load `mlf_core.cfg` and its `current_version`.
    pub fn new(project_dir: &Path, downgrade: bool) -> Result<Self, BumpError> {
        let config = ProjectConfig::load(project_dir)?;
        let current = config.current_version()?.to_string();
        Ok(VersionBumper { project_dir: project_dir.to_path_buf(), config, current, downgrade })
    }

    pub fn current_version(&self) -> &str {
        &self.current
    }

    /// Check that bumping to `new` is allowed.
    pub fn can_run(&self, new: &str) -> Result<(), BumpError> {
        let new_v: Version = new.parse()?;
        let cur_v: Version = self.current.parse()?;

        if new_v == cur_v {
            return Err(BumpError::SameVersion { version: new.to_string() });
        }
        if cur_v.snapshot && new_v != cur_v.release() {
            return Err(BumpError::SnapshotToOther {
                current: self.current.clone(),
                new: new.to_string(),
                release: cur_v.release().to_string(),
            });
        }
        if self.downgrade {
            return Ok(());
        }
        if new_v.snapshot && new_v.release() == cur_v {
            return Err(BumpError::NeedsDowngrade {
                current: self.current.clone(),
                new: new.to_string(),
            });
        }
        let same_release = cur_v.triple() == new_v.triple();
        if (same_release && (cur_v.snapshot || new_v.snapshot)) || cur_v.triple() < new_v.triple() {
            Ok(())
        } else {
            Err(BumpError::NotGreater { current: self.current.clone(), new: new.to_string() })
        }
    }

    /// `true` for +1 on exactly one component with every lower component
    /// reset to zero, or a SNAPSHOT released as-is. Anything else deserves a
    /// confirmation.
    pub fn is_usual_bump(&self, new: &str) -> bool {
        let (Ok(cur), Ok(new)) = (self.current.parse::<Version>(), new.parse::<Version>()) else {
            return false;
        };
        let delta = version::compare_versions(&cur, &new);
        if delta.is_major {
            new.minor == 0 && new.patch == 0 && new.major == cur.major + 1
        } else if delta.is_minor {
            new.patch == 0 && new.minor == cur.minor + 1
        } else if delta.is_patch {
            new.patch == cur.patch + 1
        } else {
            true
        }
    }

    /// Bump to `new`, dating a new changelog section with `date`.
    ///
    /// Call [`can_run`](Self::can_run) first; `bump` does not re-check.
    pub fn bump(&mut self, new: &str, date: NaiveDate) -> Result<BumpOutcome, BumpError> {
        let changelog_path = self.project_dir.join(CHANGELOG_FILE);
        if !self.downgrade && !changelog_path.is_file() {
            return Err(BumpError::MissingChangelog { path: self.project_dir.clone() });
        }
        tracing::info!("bumping {} from {} to {new}", self.project_dir.display(), self.current);

        let mut line_changes = Vec::new();
        let mut changed_files = vec![PathBuf::from(CONFIG_FILE)];
        for file in self.config.bump_files() {
            let changes = replace_in_file(&self.project_dir, &file.path, file.section, new)?;
            if !changes.is_empty() {
                changed_files.push(file.path.clone());
                line_changes.extend(changes);
            }
        }

        self.config.set_current_version(new);
        self.config.save()?;

        let changelog = self.update_changelog(&changelog_path, new, date)?;
        if matches!(changelog, ChangelogUpdate::SectionAdded | ChangelogUpdate::SnapshotRenamed) {
            changed_files.push(PathBuf::from(CHANGELOG_FILE));
        }

        let committed = self.commit(&changed_files, new)?;
        let previous = std::mem::replace(&mut self.current, new.to_string());
        Ok(BumpOutcome {
            previous,
            new: new.to_string(),
            line_changes,
            changed_files,
            changelog,
            committed,
        })
    }

    fn update_changelog(
        &self,
        path: &Path,
        new: &str,
        date: NaiveDate,
    ) -> Result<ChangelogUpdate, BumpError> {
        if self.downgrade {
            tracing::warn!("downgrade mode: no changelog section is added");
            return Ok(ChangelogUpdate::SkippedDowngrade);
        }
        let content = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        let snapshot = self.current.ends_with(version::SNAPSHOT_SUFFIX);
        let updated = if snapshot {
            changelog::replace_snapshot_header(&content, &self.current, new, date)
        } else {
            changelog::insert_section(&content, &self.current, new, date)
        };
        match updated {
            Some(text) => {
                atomic_write(path, text.as_bytes()).map_err(|e| io_err(path, e))?;
                Ok(if snapshot { ChangelogUpdate::SnapshotRenamed } else { ChangelogUpdate::SectionAdded })
            }
            None => {
                tracing::warn!("no changelog section for {} found in {}", self.current, path.display());
                Ok(ChangelogUpdate::HeaderNotFound)
            }
        }
    }

    fn commit(&self, changed_files: &[PathBuf], new: &str) -> Result<bool, BumpError> {
        if !git::is_work_tree(&self.project_dir) {
            return Ok(false);
        }
        let repo = GitRepo::open(&self.project_dir)?;
        let paths: Vec<String> =
            changed_files.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        repo.add(&refs)?;
        repo.commit(&format!("Bump version from {} to {new}", self.current))?;
        tracing::info!("committed version bump to {new}");
        Ok(true)
    }
}

/// Replace the version tokens on every bumpable line of `root/rel`.
fn replace_in_file(
    root: &Path,
    rel: &Path,
    section: BumpSection,
    new: &str,
) -> Result<Vec<LineChange>, BumpError> {
    let path = root.join(rel);
    let content = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let mut changes = Vec::new();
    let mut out = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        if !line_is_bumpable(section, line) {
            out.push_str(line);
            continue;
        }
        let replaced = version::replace_versions(line, new);
        if replaced != line {
            changes.push(LineChange {
                file: rel.to_path_buf(),
                before: line.trim().to_string(),
                after: replaced.trim().to_string(),
            });
        }
        out.push_str(&replaced);
    }
    if !changes.is_empty() {
        tracing::debug!("updating {} version(s) in {}", changes.len(), path.display());
        atomic_write(&path, out.as_bytes()).map_err(|e| io_err(&path, e))?;
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn bumper(current: &str, downgrade: bool) -> (TempDir, VersionBumper) {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            format!("[bumpversion]\ncurrent_version = {current}\n"),
        )
        .unwrap();
        let bumper = VersionBumper::new(dir.path(), downgrade).unwrap();
        (dir, bumper)
    }

    #[rstest]
    #[case("1.0.0", "1.0.1")]
    #[case("1.0.0", "2.0.0")]
    #[case("1.0.0", "1.1.0-SNAPSHOT")]
    #[case("1.0.0-SNAPSHOT", "1.0.0")]
    fn allowed_bumps(#[case] current: &str, #[case] new: &str) {
        let (_dir, b) = bumper(current, false);
        assert!(b.can_run(new).is_ok(), "{current} -> {new}");
    }

    #[rstest]
    #[case("1.0.0", "1.0")]
    #[case("1.0.0", "1.0.0.1")]
    #[case("1.0.0", "1.0.0")]
    #[case("1.0.0-SNAPSHOT", "1.0.1")]
    #[case("1.0.0", "1.0.0-SNAPSHOT")]
    #[case("1.2.0", "1.1.9")]
    fn refused_bumps(#[case] current: &str, #[case] new: &str) {
        let (_dir, b) = bumper(current, false);
        assert!(b.can_run(new).is_err(), "{current} -> {new}");
    }

    #[test]
    fn downgrade_allows_lower_and_snapshot() {
        let (_dir, b) = bumper("1.2.0", true);
        assert!(b.can_run("1.1.9").is_ok());
        assert!(b.can_run("1.2.0-SNAPSHOT").is_ok());
        assert!(matches!(b.can_run("1.2.0"), Err(BumpError::SameVersion { .. })));
    }

    #[rstest]
    #[case("1.8.3", "2.0.0", true)]
    #[case("1.8.3", "3.0.0", false)]
    #[case("1.8.3", "2.1.0", false)]
    #[case("1.8.5", "1.9.0", true)]
    #[case("1.8.5", "1.9.1", false)]
    #[case("1.8.5", "1.8.6", true)]
    #[case("1.8.5", "1.8.8", false)]
    #[case("3.0.0-SNAPSHOT", "3.0.0", true)]
    fn bump_ranges(#[case] current: &str, #[case] new: &str, #[case] usual: bool) {
        let (_dir, b) = bumper(current, false);
        assert_eq!(b.is_usual_bump(new), usual, "{current} -> {new}");
    }

    #[test]
    fn replace_honours_tags() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("a.txt"),
            "version = 1.0.0\npinned 1.0.0 # <<MLF-CORE_NO_BUMP>>\nip 1.0.0.1\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.txt"),
            "version = 1.0.0\nforced 1.0.0 <<MLF-CORE_FORCE_BUMP>>\n",
        )
        .unwrap();

        let a = replace_in_file(dir.path(), Path::new("a.txt"), BumpSection::Whitelisted, "1.1.0").unwrap();
        let b = replace_in_file(dir.path(), Path::new("b.txt"), BumpSection::Blacklisted, "1.1.0").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.txt")).unwrap(),
            "version = 1.1.0\npinned 1.0.0 # <<MLF-CORE_NO_BUMP>>\nip 1.0.0.1\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("b.txt")).unwrap(),
            "version = 1.0.0\nforced 1.1.0 <<MLF-CORE_FORCE_BUMP>>\n"
        );
    }
}
