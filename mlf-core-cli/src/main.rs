//! mlf-core: reproducible machine learning project templates.
//!
//! # Usage
//!
//! ```text
//! mlf-core list
//! mlf-core info <handle>
//! mlf-core create [--domain mlflow --language pytorch ...] [--github-orga acme] [--no-input]
//! mlf-core lint [project_dir]
//! mlf-core bump-version <new_version> [project_dir] [--downgrade] [--yes]
//! mlf-core bump-version --project-version [project_dir]
//! mlf-core sync <project_dir> [pat] [username] [--check-update] [--set-token]
//! mlf-core config general|pat|view
//! mlf-core fix-artifact-paths [path]
//! ```

mod commands;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    bump::BumpArgs, config::ConfigCommand, create::CreateArgs,
    fix_artifact_paths::FixArtifactPathsArgs, info::InfoArgs, lint::LintArgs, list::ListArgs,
    sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "mlf-core",
    version,
    about = "Create, lint, bump and sync reproducible machine learning projects",
    long_about = None,
)]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Append a debug log to this file.
    #[arg(short, long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all available templates.
    List(ListArgs),

    /// Show details for a template or a family of templates.
    Info(InfoArgs),

    /// Create a new project from a template.
    Create(CreateArgs),

    /// Check a project against the template's conventions.
    Lint(LintArgs),

    /// Bump the version of a project everywhere it is recorded.
    BumpVersion(BumpArgs),

    /// Apply a newer template release to a project through a pull request.
    Sync(SyncArgs),

    /// Manage the user configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Point artifact locations in a local `mlruns` store at its current path.
    FixArtifactPaths(FixArtifactPathsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_file.as_deref())?;
    match cli.command {
        Commands::List(args) => args.run(),
        Commands::Info(args) => args.run(),
        Commands::Create(args) => args.run(),
        Commands::Lint(args) => args.run(),
        Commands::BumpVersion(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Config { command } => commands::config::run(command),
        Commands::FixArtifactPaths(args) => args.run(),
    }
}

fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    let file = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::DEBUG);
            Some(layer)
        }
        None => None,
    };

    let _ = tracing_subscriber::registry().with(console).with(file).try_init();
    Ok(())
}
