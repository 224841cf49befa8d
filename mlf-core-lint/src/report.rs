//! Accumulated lint results.

use std::fmt;

/// One finding, keyed by a stable code such as `general-5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintResult {
    pub code: String,
    pub message: String,
}

impl fmt::Display for LintResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Passed, warned and failed results in the order the checks produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub passed: Vec<LintResult>,
    pub warned: Vec<LintResult>,
    pub failed: Vec<LintResult>,
}

fn result(code: &str, message: impl Into<String>) -> LintResult {
    LintResult { code: code.to_string(), message: message.into() }
}

impl LintReport {
    pub fn pass(&mut self, code: &str, message: impl Into<String>) {
        self.passed.push(result(code, message));
    }

    pub fn warn(&mut self, code: &str, message: impl Into<String>) {
        self.warned.push(result(code, message));
    }

    pub fn fail(&mut self, code: &str, message: impl Into<String>) {
        self.failed.push(result(code, message));
    }

    /// Append every result of `other`.
    pub fn merge(&mut self, other: LintReport) {
        self.passed.extend(other.passed);
        self.warned.extend(other.warned);
        self.failed.extend(other.failed);
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// True when nothing failed or warned.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.warned.is_empty()
    }

    pub fn failed_with(&self, code: &str) -> bool {
        self.failed.iter().any(|r| r.code == code)
    }
}
