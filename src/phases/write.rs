//! Phase 5: Writing and Verifying
//!
//! The final phase replaces the target with the merged document and then asks
//! the validator whether the result is usable.
//!
//! ## Process
//!
//! 1.  **Serialize**: Render the merged document as YAML. Nothing on disk is
//!     touched if this fails.
//!
//! 2.  **Write**: Write to a temporary file next to the target, flush it, and
//!     rename it over the target. A failure partway through leaves the old
//!     target in place.
//!
//! 3.  **Verify**: Run the validator against the target.
//!
//! 4.  **Commit or roll back**: On success the target is made owner-only
//!     (0600). On any failure after the write started, the backup is copied
//!     back over the target, or the target is removed when there was no
//!     previous file, and [`Error::WriteRejected`] is returned.
//!
//! A symlinked target is written through: [`resolve_target`] finds the file
//! the link points at, and the backup, write and rollback all act on that.
//!
//! Rollback is tied to [`PendingWrite`]: dropping one that was never committed
//! restores the target, so early returns cannot leave a rejected file behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use super::BackupStatus;
use crate::config::KubeConfig;
use crate::error::{Error, Restoration, Result};
use crate::validator::Validator;

/// Where a write is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    /// The target may already have been replaced, but nothing is verified.
    Written,
    /// Validator accepted the file and it was committed.
    Verified,
    /// The write was undone.
    RolledBack,
}

/// A target replacement that is rolled back unless committed.
#[derive(Debug)]
pub struct PendingWrite<'a> {
    target: &'a Path,
    backup: &'a BackupStatus,
    state: WriteState,
}

impl<'a> PendingWrite<'a> {
    /// Start a write. Refuses when the target exists without a backup.
    pub fn begin(target: &'a Path, backup: &'a BackupStatus) -> Result<Self> {
        if *backup == BackupStatus::TargetMissing && target.exists() {
            return Err(Error::Backup {
                target: target.to_path_buf(),
                message: "target exists but no backup was taken".to_string(),
            });
        }
        Ok(Self {
            target,
            backup,
            state: WriteState::Written,
        })
    }

    pub fn state(&self) -> WriteState {
        self.state
    }

    /// Accept the written file: make it owner-only and stop guarding it.
    ///
    /// If the permissions cannot be set the write is rolled back instead.
    pub fn commit(mut self) -> Result<()> {
        if let Err(e) = set_owner_only(self.target) {
            return Err(self.reject(format!("cannot set permissions: {}", e)));
        }
        self.state = WriteState::Verified;
        info!("Committed {}", self.target.display());
        Ok(())
    }

    /// Undo the write and report what the target now holds.
    pub fn rollback(mut self) -> Result<Restoration> {
        self.state = WriteState::RolledBack;
        restore(self.target, self.backup)
    }

    /// Roll back and describe the rejection, including what was restored.
    fn reject(self, reason: String) -> Error {
        let target = self.target.to_path_buf();
        match self.rollback() {
            Ok(restoration) => {
                error!("Rolled back {}: {}", target.display(), restoration);
                Error::WriteRejected {
                    target,
                    reason,
                    restoration,
                }
            }
            Err(e) => e,
        }
    }
}

impl Drop for PendingWrite<'_> {
    fn drop(&mut self) {
        if self.state != WriteState::Written {
            return;
        }
        self.state = WriteState::RolledBack;
        if let Err(e) = restore(self.target, self.backup) {
            error!("{}", e);
        }
    }
}

/// Execute Phase 5: replace `target` with `config` and verify it.
pub fn execute(
    config: &KubeConfig,
    target: &Path,
    backup: &BackupStatus,
    validator: &dyn Validator,
) -> Result<()> {
    let yaml = config.to_yaml()?;
    let pending = PendingWrite::begin(target, backup)?;

    let verdict = replace_contents(target, yaml.as_bytes()).and_then(|()| {
        debug!("Wrote {} bytes to {}", yaml.len(), target.display());
        validator.validate(target)
    });

    match verdict {
        Ok(()) => pending.commit(),
        Err(e) => Err(pending.reject(e.to_string())),
    }
}

/// The path to write through: a symlinked target resolves to the file it
/// points at, so the link itself survives both commit and rollback.
///
/// A dangling link is refused before anything is touched.
pub fn resolve_target(target: &Path) -> Result<PathBuf> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let resolved = fs::canonicalize(target).map_err(|e| Error::Write {
                path: target.to_path_buf(),
                message: format!("cannot resolve symlink: {}", e),
            })?;
            info!(
                "Target {} is a symlink; writing to {}",
                target.display(),
                resolved.display()
            );
            Ok(resolved)
        }
        _ => Ok(target.to_path_buf()),
    }
}

/// Replace `target` via a flushed temporary sibling and a rename.
fn replace_contents(target: &Path, content: &[u8]) -> Result<()> {
    let write_error = |e: io::Error| Error::Write {
        path: target.to_path_buf(),
        message: e.to_string(),
    };

    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(write_error)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".kubemerge-")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(write_error)?;
    temp.write_all(content).map_err(write_error)?;
    temp.as_file().sync_all().map_err(write_error)?;
    temp.persist(target).map_err(|e| write_error(e.error))?;
    Ok(())
}

fn restore(target: &Path, backup: &BackupStatus) -> Result<Restoration> {
    let rollback_error = |e: io::Error| Error::Rollback {
        target: target.to_path_buf(),
        message: e.to_string(),
    };

    match backup {
        BackupStatus::Created(path) => {
            fs::copy(path, target).map_err(rollback_error)?;
            info!("Restored {} from {}", target.display(), path.display());
            Ok(Restoration::Restored {
                backup: path.clone(),
            })
        }
        BackupStatus::TargetMissing => {
            if target.exists() {
                fs::remove_file(target).map_err(rollback_error)?;
                info!("Removed rejected {}", target.display());
            }
            Ok(Restoration::Removed)
        }
    }
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> io::Result<()> {
    Ok(())
}
