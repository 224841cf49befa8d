//! `CHANGELOG.rst` linting (`general-6`).
//!
//! Expected layout:
//!
//! ```text
//! .. _changelog_f:          optional label
//!
//! =========
//! Changelog                 title, fenced by `=` lines of the same length
//! =========
//!
//! 1.2.3 (2021-05-06)        newest section first
//! ------------------        underline at least as long as the header
//!
//! **Added**
//! **Fixed**
//! **Dependencies**
//! **Deprecated**
//! ```

use std::sync::OnceLock;

use regex::Regex;

use mlf_core_core::version::Version;

use crate::report::LintReport;

pub const CODE: &str = "general-6";

const SUBSECTIONS: [&str; 4] = ["**Added**", "**Fixed**", "**Dependencies**", "**Deprecated**"];

fn section_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d+\.\d+\.\d+(-SNAPSHOT)? \(\d{4}-\d{2}-\d{2}\)$").unwrap_or_else(|e| {
            unreachable!("section header pattern is a valid regex: {e}")
        })
    })
}

/// `true` if `line` opens a changelog section, e.g. `1.2.3 (2021-05-06)`.
pub fn is_section_header(line: &str) -> bool {
    section_header_re().is_match(line.trim_end())
}

/// Lints the text of a changelog.
pub struct ChangelogLinter<'a> {
    lines: Vec<&'a str>,
}

impl<'a> ChangelogLinter<'a> {
    pub fn new(content: &'a str) -> Self {
        ChangelogLinter { lines: content.lines().map(str::trim_end).collect() }
    }

    /// Run every changelog rule. The first violation stops the lint.
    pub fn lint(&self) -> LintReport {
        let mut report = LintReport::default();
        if self.lines.len() < 3 {
            report.fail(
                CODE,
                "Changelog does not seem to contain a header and/or at least one section!",
            );
            return report;
        }
        match self.lint_header() {
            Err(msg) => report.fail(CODE, msg),
            Ok(first_section) => match self.lint_sections(first_section) {
                Err(msg) => report.fail(CODE, msg),
                Ok(()) => report.pass(CODE, "Changelog linting passed!"),
            },
        }
        report
    }

    /// Validate the title block and return the index of the first section
    /// header.
    fn lint_header(&self) -> Result<usize, &'static str> {
        let mut header_detected = false;
        for (idx, line) in self.lines.iter().enumerate() {
            if is_section_header(line) {
                if !header_detected {
                    return Err("Changelog does not seem to contain a header or your header syntax is wrong!");
                }
                if !self.is_underlined(idx, '-') {
                    return Err("Invalid section header start detected!");
                }
                return Ok(idx);
            }
            if line.contains("CHANGELOG") || line.contains("Changelog") {
                let bar = "=".repeat(line.chars().count());
                let above = idx.checked_sub(1).and_then(|i| self.lines.get(i));
                let below = self.lines.get(idx + 1);
                if above.copied() != Some(bar.as_str()) || below.copied() != Some(bar.as_str()) {
                    return Err("Your Changelog header syntax does not match length of your Changelogs title!");
                }
                header_detected = true;
            }
        }
        if header_detected {
            Err("No changelog sections detected!")
        } else {
            Err("Changelog does not seem to contain a header or your header syntax is wrong!")
        }
    }

    fn lint_sections(&self, first_section: usize) -> Result<(), &'static str> {
        let headers: Vec<usize> = (first_section..self.lines.len())
            .filter(|&i| is_section_header(self.lines[i]))
            .collect();

        let mut previous: Option<(u64, u64, u64)> = None;
        for (n, &start) in headers.iter().enumerate() {
            let end = headers.get(n + 1).copied().unwrap_or(self.lines.len());
            let header = self.lines[start];

            let version = header
                .split(' ')
                .next()
                .and_then(|v| v.parse::<Version>().ok())
                .map(|v| v.triple())
                .ok_or("Invalid section header start detected!")?;
            if previous.is_some_and(|prev| version >= prev) {
                return Err("Older sections cannot have greater version numbers than newer sections!");
            }
            previous = Some(version);

            if !self.is_underlined(start, '-') {
                return Err("Your sections subheader underline does not match the headers length!");
            }

            let body = &self.lines[start + 1..end];
            let positions: Option<Vec<usize>> = SUBSECTIONS
                .iter()
                .map(|s| body.iter().position(|l| l == s))
                .collect();
            match positions {
                None => return Err("Section misses one or more required subsections!"),
                Some(p) if !p.windows(2).all(|w| w[0] < w[1]) => {
                    return Err(
                        "Sections subheader order should be **Added**, **Fixed**, **Dependencies**, **Deprecated**!",
                    )
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// The line after `idx` is made of `ch` only and is at least as long as
    /// the line at `idx`.
    fn is_underlined(&self, idx: usize, ch: char) -> bool {
        let width = self.lines[idx].chars().count();
        self.lines.get(idx + 1).is_some_and(|next| {
            !next.is_empty() && next.chars().all(|c| c == ch) && next.chars().count() >= width
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "\
.. _changelog_f:

=========
Changelog
=========

1.1.0 (2021-06-01)
------------------

**Added**

* more things

**Fixed**

**Dependencies**

**Deprecated**


1.0.0 (2021-05-06)
------------------

**Added**

**Fixed**

**Dependencies**

**Deprecated**
";

    #[test]
    fn valid_changelog_passes() {
        let report = ChangelogLinter::new(VALID).lint();
        assert!(report.failed.is_empty(), "{:?}", report.failed);
        assert_eq!(report.passed[0].code, "general-6");
    }

    #[test]
    fn section_headers() {
        assert!(is_section_header("1.0.0 (2021-05-06)"));
        assert!(is_section_header("1.0.0-SNAPSHOT (2021-05-06)\n"));
        assert!(!is_section_header("1.0 (2021-05-06)"));
        assert!(!is_section_header("1.0.0 (06.05.2021)"));
    }

    #[test]
    fn increasing_versions_fail() {
        let swapped = VALID.replace("1.1.0 (2021-06-01)", "0.9.0 (2021-06-01)");
        let report = ChangelogLinter::new(&swapped).lint();
        assert!(report.failed[0].message.starts_with("Older sections"));
    }

    #[test]
    fn short_title_fence_fails() {
        let bad = VALID.replacen("=========\nChangelog", "======\nChangelog", 1);
        let report = ChangelogLinter::new(&bad).lint();
        assert!(report.failed[0].message.contains("header syntax"));
    }

    #[test]
    fn missing_subsection_fails() {
        let bad = VALID.replacen("**Dependencies**\n", "", 1);
        let report = ChangelogLinter::new(&bad).lint();
        assert_eq!(report.failed[0].message, "Section misses one or more required subsections!");
    }

    #[test]
    fn tiny_changelog_fails() {
        let report = ChangelogLinter::new("Changelog\n").lint();
        assert!(report.has_failures());
    }
}
