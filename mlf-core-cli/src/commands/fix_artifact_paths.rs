//! `mlf-core fix-artifact-paths [path]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use mlf_core_core::mlruns::{fix_artifact_paths, ArtifactPathFix};

use super::resolve_dir;

#[derive(Args, Debug)]
pub struct FixArtifactPathsArgs {
    /// Directory containing the `mlruns` folder.
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

impl FixArtifactPathsArgs {
    pub fn run(self) -> Result<()> {
        let dir = resolve_dir(&self.path)?;
        let fixes = fix_artifact_paths(&dir)
            .with_context(|| format!("failed to fix artifact paths under '{}'", dir.display()))?;

        let mut rewritten = 0;
        for fix in &fixes {
            match fix {
                ArtifactPathFix::Rewritten { meta_yaml, key, location } => {
                    rewritten += 1;
                    println!("{} {}: {key} = {location}", "✓".green(), meta_yaml.display());
                }
                ArtifactPathFix::NotLocal { meta_yaml, location } => println!(
                    "{} skipped {}: {location} is not stored locally",
                    "!".yellow(),
                    meta_yaml.display()
                ),
            }
        }
        println!("fixed {rewritten} artifact path(s)");
        Ok(())
    }
}
