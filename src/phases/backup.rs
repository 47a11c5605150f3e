//! Phase 4: Backing Up the Target
//!
//! Before the target is replaced, an existing target is copied byte for byte
//! to a sibling named `<target>-backup-<YYYYMMDD-HHMMSS>`. If that name is
//! already taken (two runs in the same second) a `.1`, `.2`, ... suffix is
//! appended until the name is free. `fs::copy` carries the original
//! permissions over to the backup.
//!
//! A missing target is not an error: there is nothing to protect, and the
//! writer removes the new file instead of restoring one if the merge is
//! rejected. Backups are never deleted by kubemerge.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};

use crate::error::{Error, Result};

/// Inserted between the target path and the timestamp.
pub const BACKUP_MARKER: &str = "-backup-";

/// `chrono` format of the backup timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Outcome of the backup phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    /// The target existed and was copied here.
    Created(PathBuf),
    /// The target did not exist; no backup was taken.
    TargetMissing,
}

impl BackupStatus {
    pub fn path(&self) -> Option<&Path> {
        match self {
            BackupStatus::Created(path) => Some(path),
            BackupStatus::TargetMissing => None,
        }
    }
}

/// First unused backup path for `target` with the given timestamp.
pub fn next_backup_path(target: &Path, stamp: &str) -> PathBuf {
    let mut base: OsString = target.as_os_str().to_owned();
    base.push(BACKUP_MARKER);
    base.push(stamp);

    let mut candidate = PathBuf::from(&base);
    let mut n = 1;
    while candidate.exists() {
        let mut name = base.clone();
        name.push(format!(".{}", n));
        candidate = PathBuf::from(name);
        n += 1;
    }
    candidate
}

/// Whether `path` is a backup of `target` made by this phase.
pub fn is_backup_of(path: &Path, target: &Path) -> bool {
    let (Some(name), Some(target_name)) = (path.file_name(), target.file_name()) else {
        return false;
    };
    let prefix = format!("{}{}", target_name.to_string_lossy(), BACKUP_MARKER);
    name.to_string_lossy().starts_with(&prefix)
}

/// Execute Phase 4: back up `target` if it exists.
pub fn execute(target: &Path) -> Result<BackupStatus> {
    if !target.exists() {
        warn!(
            "No existing config at {}; continuing without a backup",
            target.display()
        );
        return Ok(BackupStatus::TargetMissing);
    }

    let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let backup = next_backup_path(target, &stamp);
    fs::copy(target, &backup).map_err(|e| Error::Backup {
        target: target.to_path_buf(),
        message: format!("cannot copy to {}: {}", backup.display(), e),
    })?;

    info!("Created backup: {}", backup.display());
    Ok(BackupStatus::Created(backup))
}
