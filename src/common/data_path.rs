// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use std::path::{Path, PathBuf};

const DATA_DIR_ENV: &str = "DATA_DIR";

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn from_cwd(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}

/// Registry overlays are usually written as `data/<file>`; the data root
/// already is that directory.
fn relative_to_data_root(path: &Path) -> &Path {
    path.strip_prefix("data").unwrap_or(path)
}

/// A configured or `DATA_DIR` root is authoritative for relative data files.
fn pinned_root(explicit_data_dir: Option<&str>) -> Option<PathBuf> {
    non_empty(explicit_data_dir)
        .or_else(|| non_empty(std::env::var(DATA_DIR_ENV).ok().as_deref()))
        .map(|dir| from_cwd(PathBuf::from(dir)))
}

/// Without a pinned root: `../data` next to the executable, then `./data`.
fn fallback_roots() -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(2);
    if let Some(bin_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        roots.push(bin_dir.join("..").join("data"));
    }
    roots.push(from_cwd(PathBuf::from("data")));
    roots
}

/// Absolute location of a data file. Absolute inputs are returned as-is.
pub fn resolve_data_path(raw_path: &str, explicit_data_dir: Option<&str>) -> PathBuf {
    let raw = PathBuf::from(raw_path);
    if raw.is_absolute() {
        return raw;
    }
    let rel = relative_to_data_root(&raw);
    if let Some(root) = pinned_root(explicit_data_dir) {
        return root.join(rel);
    }
    fallback_roots()
        .into_iter()
        .map(|root| root.join(rel))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| from_cwd(raw.clone()))
}

/// Like [`resolve_data_path`], but the file must exist.
pub fn resolve_required_data_path(
    raw_path: &str,
    explicit_data_dir: Option<&str>,
) -> Result<PathBuf, AppError> {
    let resolved = resolve_data_path(raw_path, explicit_data_dir);
    if resolved.exists() {
        Ok(resolved)
    } else {
        Err(AppError::Config(format!(
            "{raw_path} expected at {}; set DATA_DIR",
            resolved.display()
        )))
    }
}
