//! Version parsing, comparison and in-text version matching.
//!
//! mlf-core only recognises versions of the form `MAJOR.MINOR.PATCH` with an
//! optional `-SNAPSHOT` suffix. `1.2`, `1.2.3.4` and `1.2.3-rc1` are invalid.
//!
//! Inside free text a version is a whole token: a match directly preceded or
//! followed by `.` (as in `1.2.3.4`) is not a version.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ProjectError;
use crate::types::ChangeSeverity;

/// Suffix marking a pre-release version.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// A parsed `MAJOR.MINOR.PATCH[-SNAPSHOT]` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub snapshot: bool,
}

impl Version {
    /// The same version without the `-SNAPSHOT` suffix.
    pub fn release(self) -> Version {
        Version { snapshot: false, ..self }
    }

    /// Numeric components only, ignoring the snapshot flag.
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// Compare the numeric components only.
    pub fn cmp_release(&self, other: &Version) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl FromStr for Version {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProjectError::InvalidVersion { version: s.to_string() };
        let (core, snapshot) = match s.strip_suffix(SNAPSHOT_SUFFIX) {
            Some(core) => (core, true),
            None => (s, false),
        };
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let mut nums = [0u64; 3];
        for (slot, part) in nums.iter_mut().zip(parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            *slot = part.parse().map_err(|_| invalid())?;
        }
        Ok(Version { major: nums[0], minor: nums[1], patch: nums[2], snapshot })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.snapshot {
            f.write_str(SNAPSHOT_SUFFIX)?;
        }
        Ok(())
    }
}

/// Returns `true` if `s` is a valid mlf-core version.
pub fn is_valid(s: &str) -> bool {
    s.parse::<Version>().is_ok()
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Which component differs between two versions. At most one flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VersionDelta {
    pub is_major: bool,
    pub is_minor: bool,
    pub is_patch: bool,
}

impl VersionDelta {
    pub fn severity(self) -> ChangeSeverity {
        if self.is_major {
            ChangeSeverity::Major
        } else if self.is_minor {
            ChangeSeverity::Minor
        } else if self.is_patch {
            ChangeSeverity::Patch
        } else {
            ChangeSeverity::None
        }
    }
}

/// Classify the difference between `old` and `new`.
///
/// `-SNAPSHOT` suffixes are ignored. Direction does not matter: a downgrade
/// from `2.0.0` to `1.9.9` is still a major change.
pub fn compare(old: &str, new: &str) -> Result<VersionDelta, ProjectError> {
    let old: Version = old.parse()?;
    let new: Version = new.parse()?;
    Ok(compare_versions(&old, &new))
}

/// [`compare`] on already parsed versions.
pub fn compare_versions(old: &Version, new: &Version) -> VersionDelta {
    if old.major != new.major {
        VersionDelta { is_major: true, ..VersionDelta::default() }
    } else if old.minor != new.minor {
        VersionDelta { is_minor: true, ..VersionDelta::default() }
    } else if old.patch != new.patch {
        VersionDelta { is_patch: true, ..VersionDelta::default() }
    } else {
        VersionDelta::default()
    }
}

// ---------------------------------------------------------------------------
// In-text matching
// ---------------------------------------------------------------------------

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\d+(?:\.\d+){2}(?:-SNAPSHOT)?").unwrap_or_else(|e| {
            unreachable!("static version pattern failed to compile: {e}")
        })
    })
}

/// Byte ranges of every version token in `line`.
pub fn find_versions(line: &str) -> Vec<std::ops::Range<usize>> {
    let bytes = line.as_bytes();
    version_regex()
        .find_iter(line)
        .filter(|m| {
            let before = m.start().checked_sub(1).map(|i| bytes[i]);
            let after = bytes.get(m.end()).copied();
            !matches!(before, Some(b'.') | Some(b'0'..=b'9')) && after != Some(b'.')
        })
        .map(|m| m.range())
        .collect()
}

/// The first version token in `line`, if any.
pub fn first_version(line: &str) -> Option<&str> {
    find_versions(line).into_iter().next().map(|r| &line[r])
}

/// Replace every version token in `line` with `replacement`.
pub fn replace_versions(line: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for range in find_versions(line) {
        out.push_str(&line[last..range.start]);
        out.push_str(replacement);
        last = range.end;
    }
    out.push_str(&line[last..]);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
