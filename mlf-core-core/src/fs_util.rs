//! Filesystem helpers shared by every crate that touches a project tree.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

/// Atomically write `contents` to `path`.
///
/// Write flow: `<name>.tmp` sibling → `rename`. The temp file lives in the
/// same directory as the target so the rename never crosses filesystems.
/// Permissions of an existing target are carried over.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    let previous = fs::metadata(path).ok().map(|m| m.permissions());

    fs::write(&tmp, contents)?;
    if let Some(perms) = previous {
        fs::set_permissions(&tmp, perms)?;
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

/// Restrict a file to its owner (`0600`). No-op off unix.
#[cfg(unix)]
pub fn set_private_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}
#[cfg(not(unix))]
pub fn set_private_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Recursively copy the contents of `src` into `dst`, overwriting files that
/// already exist. `dst` is created if missing.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Delete every entry directly under `dir` whose name is not in `keep`.
pub fn remove_all_except(dir: &Path, keep: &[&str]) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if keep.iter().any(|k| name == *k) {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
