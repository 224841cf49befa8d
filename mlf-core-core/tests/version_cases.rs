//! Table-driven version classification tests.
//!
//! Each `#[case]` is isolated, with no shared state.

use mlf_core_core::{
    version::{self, Version},
    ChangeSeverity, ProjectError,
};
use rstest::rstest;

#[rstest]
#[case("1.2.3", "1.2.3", ChangeSeverity::None)]
#[case("0.0.0", "0.0.0", ChangeSeverity::None)]
#[case("1.2.3", "1.2.4", ChangeSeverity::Patch)]
#[case("1.2.3", "1.3.0", ChangeSeverity::Minor)]
#[case("1.2.3", "2.0.0", ChangeSeverity::Major)]
#[case("1.2.3-SNAPSHOT", "1.2.3", ChangeSeverity::None)]
#[case("1.2.3", "1.2.4-SNAPSHOT", ChangeSeverity::Patch)]
#[case("3.0.0", "2.9.9", ChangeSeverity::Major)]
#[case("1.10.0", "1.9.0", ChangeSeverity::Minor)]
#[case("1.0.10", "1.0.9", ChangeSeverity::Patch)]
fn classification(#[case] old: &str, #[case] new: &str, #[case] expected: ChangeSeverity) {
    let delta = version::compare(old, new).expect("valid versions");
    assert_eq!(delta.severity(), expected, "{old} -> {new}");
    let flags = [delta.is_major, delta.is_minor, delta.is_patch];
    assert!(flags.iter().filter(|f| **f).count() <= 1, "at most one flag may be set");
}

#[rstest]
#[case("1.2")]
#[case("1.2.3.4")]
#[case("a.b.c")]
#[case("1.2.3-snapshot")]
#[case("v1.2.3")]
fn malformed_versions_are_rejected(#[case] bad: &str) {
    let err = version::compare(bad, "1.0.0").unwrap_err();
    assert!(matches!(err, ProjectError::InvalidVersion { .. }), "got: {err}");
    assert!(bad.parse::<Version>().is_err());
}

#[rstest]
#[case("__version__ = '0.1.0'", Some("0.1.0"))]
#[case("version: 1.0.0-SNAPSHOT # <<MLF-CORE_NO_BUMP>>", Some("1.0.0-SNAPSHOT"))]
#[case("numpy==1.19.2.1", None)]
#[case("python=3.8", None)]
fn in_text_matching(#[case] line: &str, #[case] expected: Option<&str>) {
    assert_eq!(version::first_version(line), expected);
}
