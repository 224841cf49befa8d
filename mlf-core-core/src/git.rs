//! Thin wrapper around the `git` command line.
//!
//! Every git interaction of mlf-core (create, bump-version, sync) goes
//! through [`GitRepo`]. Commands run with `current_dir` set to the
//! repository, so the process working directory is never changed.
//!
//! # Error Handling
//!
//! - [`GitError::NotARepo`]: the directory is not inside a work tree
//! - [`GitError::CommandFailed`]: git ran and exited non-zero
//! - [`GitError::Spawn`]: the `git` binary could not be started

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository: {path}")]
    NotARepo { path: PathBuf },

    #[error("`git {command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("could not run git: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

/// A git work tree on disk.
#[derive(Debug, Clone)]
pub struct GitRepo {
    dir: PathBuf,
}

fn git_in(dir: &Path, args: &[&str]) -> Result<Output, GitError> {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| GitError::Spawn { source })
}

fn check(args: &[&str], output: Output) -> Result<String, GitError> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(GitError::CommandFailed {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

fn split_nul(out: &str) -> Vec<String> {
    out.split('\0').filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// `true` if `dir` is inside a git work tree.
pub fn is_work_tree(dir: &Path) -> bool {
    git_in(dir, &["rev-parse", "--is-inside-work-tree"])
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "true")
        .unwrap_or(false)
}

/// `true` if the `git` binary can be started.
pub fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok_and(|o| o.status.success())
}

impl GitRepo {
    /// Open the work tree at `dir`.
    pub fn open(dir: &Path) -> Result<Self, GitError> {
        if !is_work_tree(dir) {
            return Err(GitError::NotARepo { path: dir.to_path_buf() });
        }
        Ok(GitRepo { dir: dir.to_path_buf() })
    }

    /// `git init -b <initial_branch>` in `dir`.
    pub fn init(dir: &Path, initial_branch: &str) -> Result<Self, GitError> {
        let args = ["init", "-q", "-b", initial_branch];
        check(&args, git_in(dir, &args)?)?;
        Ok(GitRepo { dir: dir.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Run `git <args>` and return stdout; non-zero exit is an error.
    pub fn run(&self, args: &[&str]) -> Result<String, GitError> {
        check(args, git_in(&self.dir, args)?)
    }

    /// Run `git <args>` and report only whether it succeeded.
    pub fn try_run(&self, args: &[&str]) -> Result<bool, GitError> {
        Ok(git_in(&self.dir, args)?.status.success())
    }

    // ---------------------------------------------------------------------
    // Inspection
    // ---------------------------------------------------------------------

    /// Staged, unstaged or untracked changes exist.
    pub fn is_dirty(&self) -> Result<bool, GitError> {
        Ok(!self.run(&["status", "--porcelain", "--untracked-files=all"])?.trim().is_empty())
    }

    /// Name of the checked-out branch.
    pub fn current_branch(&self) -> Result<String, GitError> {
        Ok(self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?.trim().to_string())
    }

    /// Absolute path of the work tree root.
    pub fn toplevel(&self) -> Result<PathBuf, GitError> {
        Ok(PathBuf::from(self.run(&["rev-parse", "--show-toplevel"])?.trim()))
    }

    pub fn head_oid(&self) -> Result<String, GitError> {
        Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    /// Paths whose staged content differs from `HEAD`.
    pub fn staged_changes(&self) -> Result<Vec<String>, GitError> {
        Ok(split_nul(&self.run(&["diff", "--cached", "--name-only", "-z", "HEAD"])?))
    }

    /// Untracked, non-ignored files relative to the work tree root.
    pub fn untracked_files(&self) -> Result<Vec<String>, GitError> {
        Ok(split_nul(&self.run(&["ls-files", "--others", "--exclude-standard", "-z"])?))
    }

    /// Ignored files and directories (directories end in `/`).
    pub fn ignored_paths(&self) -> Result<Vec<String>, GitError> {
        Ok(split_nul(&self.run(&[
            "ls-files",
            "--others",
            "--ignored",
            "--exclude-standard",
            "--directory",
            "-z",
        ])?))
    }

    /// `path` exists in the `HEAD` commit.
    pub fn tracked_in_head(&self, path: &str) -> Result<bool, GitError> {
        self.try_run(&["cat-file", "-e", &format!("HEAD:{path}")])
    }

    // ---------------------------------------------------------------------
    // Branches
    // ---------------------------------------------------------------------

    pub fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.run(&["checkout", "-q", branch]).map(drop)
    }

    /// `git checkout -b <branch> <start_point>`.
    pub fn checkout_new(&self, branch: &str, start_point: &str) -> Result<(), GitError> {
        self.run(&["checkout", "-q", "-b", branch, start_point]).map(drop)
    }

    /// Create (or move) `branch` to `HEAD` without checking it out.
    pub fn create_branch(&self, branch: &str) -> Result<(), GitError> {
        self.run(&["branch", "-f", branch]).map(drop)
    }

    // ---------------------------------------------------------------------
    // Index and commits
    // ---------------------------------------------------------------------

    /// `git add -A`.
    pub fn add_all(&self) -> Result<(), GitError> {
        self.run(&["add", "-A"]).map(drop)
    }

    pub fn add(&self, paths: &[&str]) -> Result<(), GitError> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.run(&args).map(drop)
    }

    /// Drop the staged change of `path` and restore its committed content.
    /// A path unknown to `HEAD` is left untracked.
    pub fn revert_path(&self, path: &str) -> Result<(), GitError> {
        self.run(&["reset", "-q", "--", path])?;
        if self.tracked_in_head(path)? {
            self.run(&["checkout", "-q", "--", path])?;
        }
        Ok(())
    }

    /// Throw away every staged, unstaged and untracked change.
    pub fn discard_changes(&self) -> Result<(), GitError> {
        self.run(&["reset", "-q", "--hard", "HEAD"])?;
        self.remove_untracked()
    }

    /// Delete untracked, non-ignored files together with directories left
    /// empty by them.
    pub fn remove_untracked(&self) -> Result<(), GitError> {
        self.run(&["clean", "-q", "-f", "-d"]).map(drop)
    }

    /// Commit the index. Fails when nothing is staged.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        self.run(&["commit", "-q", "-m", message]).map(drop)
    }

    // ---------------------------------------------------------------------
    // Remotes
    // ---------------------------------------------------------------------

    /// `git push --force -u <remote> <branch>`.
    pub fn push_force(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(&["push", "-q", "--force", "-u", remote, branch]).map(drop)
    }

    /// `git push <remote> <branch>:<branch>`.
    pub fn push_branch(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(&["push", "-q", remote, &format!("{branch}:{branch}")]).map(drop)
    }
}
