//! Version bumping for mlf-core projects.
//!
//! ```no_run
//! # use std::path::Path;
//! # fn main() -> Result<(), mlf_core_bump::BumpError> {
//! let mut bumper = mlf_core_bump::VersionBumper::new(Path::new("."), false)?;
//! bumper.can_run("0.2.0")?;
//! let today = chrono::Local::now().date_naive();
//! let outcome = bumper.bump("0.2.0", today)?;
//! println!("{} line(s) changed", outcome.line_changes.len());
//! # Ok(())
//! # }
//! ```

pub mod bumper;
pub mod changelog;
pub mod error;

pub use bumper::{BumpOutcome, ChangelogUpdate, LineChange, VersionBumper};
pub use error::BumpError;
