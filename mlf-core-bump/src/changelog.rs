//! Rewriting `CHANGELOG.rst` on a version bump.
//!
//! Both functions are pure: they take the changelog text and return the new
//! text, or `None` when the section header of the current version is absent.

use chrono::NaiveDate;

pub const CHANGELOG_FILE: &str = "CHANGELOG.rst";

const SUBSECTIONS: [&str; 4] = ["**Added**", "**Fixed**", "**Dependencies**", "**Deprecated**"];

/// `{version} ({date})` followed by a matching `-` underline.
fn header(version: &str, date: NaiveDate) -> String {
    let title = format!("{version} ({})", date.format("%Y-%m-%d"));
    let underline = "-".repeat(title.len());
    format!("{title}\n{underline}")
}

/// `true` if `line` is exactly `{version} (YYYY-MM-DD)`.
fn is_header_of(line: &str, version: &str) -> bool {
    line.strip_prefix(version)
        .and_then(|rest| rest.strip_prefix(" ("))
        .and_then(|rest| rest.strip_suffix(')'))
        .is_some_and(|date| {
            date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
        })
}

/// An empty section for `new`, with every subsection heading in order.
pub fn new_section(new: &str, date: NaiveDate) -> String {
    format!("{}\n\n{}", header(new, date), SUBSECTIONS.join("\n\n"))
}

/// Insert an empty section for `new` right above the section of `current`.
pub fn insert_section(content: &str, current: &str, new: &str, date: NaiveDate) -> Option<String> {
    let section = new_section(new, date);
    let mut out = String::with_capacity(content.len() + section.len() + 3);
    let mut found = false;
    for line in content.split_inclusive('\n') {
        if is_header_of(line.trim_end_matches(['\r', '\n']), current) {
            out.push_str(&section);
            out.push_str("\n\n\n");
            found = true;
        }
        out.push_str(line);
    }
    found.then_some(out)
}

/// Rename the SNAPSHOT section `current` to `new` with today's `date`,
/// replacing its underline to fit the new header.
pub fn replace_snapshot_header(
    content: &str,
    current: &str,
    new: &str,
    date: NaiveDate,
) -> Option<String> {
    let mut out = String::with_capacity(content.len());
    let mut lines = content.split_inclusive('\n').peekable();
    let mut found = false;
    while let Some(line) = lines.next() {
        if !found && is_header_of(line.trim_end_matches(['\r', '\n']), current) {
            out.push_str(&header(new, date));
            out.push('\n');
            if lines.peek().is_some_and(|next| {
                let next = next.trim_end();
                !next.is_empty() && next.chars().all(|c| c == '-')
            }) {
                lines.next();
            }
            found = true;
            continue;
        }
        out.push_str(line);
    }
    found.then_some(out)
}
