//! # Fragment Discovery
//!
//! Finds candidate kubeconfig fragments in an input directory. Only regular
//! files directly inside the directory are considered, and only those with a
//! `.yaml` or `.yml` extension. The merge target and its backups are never
//! picked up, even when they live in the same directory.
//!
//! Results are sorted by path so that repeated runs merge in the same order;
//! with the first-wins merge policy that order decides which duplicate wins.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::debug;

use crate::error::{Error, Result};
use crate::phases::backup::is_backup_of;

/// File name filter given with `--exclude`.
///
/// A pattern containing glob metacharacters is matched as a glob against the
/// file name; anything else matches when the file name contains it.
#[derive(Debug, Clone)]
pub enum ExcludePattern {
    Glob(Pattern),
    Substring(String),
}

impl ExcludePattern {
    pub fn new(raw: &str) -> Result<Self> {
        if raw.contains(['*', '?', '[']) {
            Ok(ExcludePattern::Glob(Pattern::new(raw)?))
        } else {
            Ok(ExcludePattern::Substring(raw.to_string()))
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            ExcludePattern::Glob(pattern) => pattern.matches(file_name),
            ExcludePattern::Substring(needle) => file_name.contains(needle.as_str()),
        }
    }
}

/// Whether `path` has a `.yaml` or `.yml` extension.
pub fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// List fragment candidates in `dir`, sorted by path.
///
/// `target` is the merge output; it and its backups are left out.
pub fn find_fragments(
    dir: &Path,
    excludes: &[ExcludePattern],
    target: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::Discovery {
            message: format!("input directory does not exist: {}", dir.display()),
        });
    }

    debug!("Scanning directory: {}", dir.display());
    let entries = fs::read_dir(dir).map_err(|e| Error::Discovery {
        message: format!("cannot read {}: {}", dir.display(), e),
    })?;

    let mut fragments = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() || !is_yaml_file(&path) {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if excludes.iter().any(|pattern| pattern.matches(&file_name)) {
            debug!("Excluded file: {}", path.display());
            continue;
        }
        if let Some(target) = target {
            if is_same_file(&path, target) || is_backup_of(&path, target) {
                debug!("Skipping merge target or backup: {}", path.display());
                continue;
            }
        }

        debug!("Found fragment: {}", path.display());
        fragments.push(path);
    }

    fragments.sort();
    debug!("Found {} fragments total", fragments.len());
    Ok(fragments)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
