//! Filesystem helpers shared by the resolver, invoker and stager

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::trace;
use walkdir::WalkDir;

use crate::error::Result;

/// Make `path` absolute against `base` and drop `.` / `..` components
/// without touching the filesystem.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Canonical form of `path` when it exists, otherwise its absolutized form.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    let absolute = absolutize(path, base);
    absolute.canonicalize().unwrap_or(absolute)
}

/// Immediate subdirectories of `dir`, keyed and sorted by name.
pub fn list_directories(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut dirs = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(dirs);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.insert(entry.file_name().to_string_lossy().into_owned(), entry.path());
        }
    }
    Ok(dirs)
}

/// Relative paths (with `/` separators) of every file under `root`, sorted.
pub fn relative_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            files.push(to_slash(relative));
        }
    }
    Ok(files)
}

/// Copy every file under `from` that `keep` accepts into `to`, preserving
/// the relative layout. Returns the relative paths copied.
pub fn copy_tree<F>(from: &Path, to: &Path, keep: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> bool,
{
    let mut copied = Vec::new();
    fs::create_dir_all(to)?;
    for relative in relative_files(from)? {
        if !keep(&relative) {
            trace!("Skipping {} (filtered)", relative);
            continue;
        }
        let target = to.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from.join(&relative), &target)?;
        copied.push(relative);
    }
    Ok(copied)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
