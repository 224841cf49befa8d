//! Splitting changed paths into template-owned and user-owned sets.

use glob::{MatchOptions, Pattern};

use mlf_core_core::types::BlacklistGlobSet;

use crate::error::SyncError;

/// fnmatch semantics: `*` also matches `/`.
const FNMATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Changed paths split by the `[sync_files_blacklisted]` globs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Paths matching a blacklist glob; the project keeps its version.
    pub owned: Vec<String>,
    /// Everything else; committed to `TEMPLATE`.
    pub syncable: Vec<String>,
}

/// Compiled blacklist globs.
#[derive(Debug, Clone)]
pub struct Blacklist {
    patterns: Vec<Pattern>,
}

impl Blacklist {
    pub fn compile(globs: &BlacklistGlobSet) -> Result<Self, SyncError> {
        let patterns = globs
            .patterns()
            .iter()
            .map(|g| {
                Pattern::new(g).map_err(|e| SyncError::InvalidGlob {
                    pattern: g.clone(),
                    message: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Blacklist { patterns })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches_with(path, FNMATCH))
    }

    /// Partition `paths`, keeping their order.
    pub fn partition<S: AsRef<str>>(&self, paths: &[S]) -> Partition {
        let mut partition = Partition::default();
        for path in paths.iter().map(AsRef::as_ref) {
            if self.matches(path) {
                partition.owned.push(path.to_string());
            } else {
                partition.syncable.push(path.to_string());
            }
        }
        partition
    }
}
