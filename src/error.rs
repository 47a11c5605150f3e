//! # Error Handling
//!
//! This module defines the centralized error type for `kubemerge`. It uses
//! `thiserror` to describe every failure the merge engine can surface, with
//! enough context (paths, reasons, restoration state) for the command layer to
//! print a useful message.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum for all failures. Per-fragment parse errors are
//!   normally caught by the parse phase and downgraded to summary warnings;
//!   only the terminal failures (no usable input, backup failure, rejected
//!   write) abort a run.
//!
//! - **`Restoration`**: What the rollback left at the target path after a
//!   rejected write, so the caller can tell the user whether their original
//!   file is back or the target was removed.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// State of the target path after a rejected write was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restoration {
    /// The pre-run content was copied back from this backup file.
    Restored { backup: PathBuf },
    /// There was no pre-run target, so the written file was removed.
    Removed,
}

impl fmt::Display for Restoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Restoration::Restored { backup } => {
                write!(f, "original restored from {}", backup.display())
            }
            Restoration::Removed => write!(f, "target removed, no previous file existed"),
        }
    }
}

/// Main error type for kubemerge operations
#[derive(Error, Debug)]
pub enum Error {
    /// A fragment could not be decoded into a kubeconfig document.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// None of the candidate fragments could be parsed.
    #[error("No valid kubeconfig fragments among {candidates} candidate file(s)")]
    NoValidInput { candidates: usize },

    /// The existing target could not be backed up, so it was left untouched.
    #[error("Failed to back up {}: {message}", target.display())]
    Backup { target: PathBuf, message: String },

    /// Writing the merged document failed before it could be verified.
    #[error("Failed to write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    /// The validator rejected the written file and the write was rolled back.
    #[error("Merged config rejected for {}: {reason} ({restoration})", target.display())]
    WriteRejected {
        target: PathBuf,
        reason: String,
        restoration: Restoration,
    },

    /// The external validator rejected a written file or could not be run.
    #[error("Validation failed ({command}): {message}")]
    Validation { command: String, message: String },

    /// Rolling back a rejected write failed; the backup is still on disk.
    #[error("Rollback failed for {}: {message}", target.display())]
    Rollback { target: PathBuf, message: String },

    /// Candidate fragment files could not be listed.
    #[error("Fragment discovery error: {message}")]
    Discovery { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
