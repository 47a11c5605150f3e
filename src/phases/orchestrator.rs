//! Orchestrator for the complete merge operation
//!
//! This module coordinates the phases into two steps so callers can report on
//! a merge before committing it:
//!
//! - [`prepare`] runs Phases 1-3 (parse, merge, resolve) and touches nothing
//!   but the fragment files it reads.
//! - [`commit`] runs Phases 4-5 (backup, write and verify) against the target.
//!
//! [`execute_merge`] does both.

use std::path::{Path, PathBuf};

use super::{backup, merge, parse, resolve, write};
use super::{BackupStatus, MergeReport, SkippedFragment};
use crate::config::KubeConfig;
use crate::error::{Error, Result};
use crate::validator::Validator;

/// Everything a merge run produced, for writing and reporting.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged document, current-context resolved
    pub config: KubeConfig,
    /// Fragments that were merged, in order
    pub fragments: Vec<PathBuf>,
    /// Candidates that failed to parse
    pub skipped: Vec<SkippedFragment>,
    pub report: MergeReport,
    /// Set once Phase 4 has run
    pub backup: Option<BackupStatus>,
}

impl MergeOutcome {
    /// The resolved current-context, if any.
    pub fn current_context(&self) -> Option<&str> {
        Some(self.config.current_context.as_str()).filter(|c| !c.is_empty())
    }
}

/// Run Phases 1-3 over `paths`, in the given order.
///
/// Fails with [`Error::NoValidInput`] when none of the paths parse.
pub fn prepare(paths: &[PathBuf]) -> Result<MergeOutcome> {
    // Phase 1: Parsing
    let parsed = parse::execute(paths);
    if parsed.fragments.is_empty() {
        return Err(Error::NoValidInput {
            candidates: paths.len(),
        });
    }

    // Phase 2: Merging
    let merged = merge::execute(&parsed.fragments);

    // Phase 3: Resolving the current context
    let mut config = merged.config;
    config.current_context =
        resolve::execute(&parsed.fragments, &config, &merged.report).unwrap_or_default();

    Ok(MergeOutcome {
        config,
        fragments: parsed.fragments.into_iter().map(|f| f.source).collect(),
        skipped: parsed.skipped,
        report: merged.report,
        backup: None,
    })
}

/// Run Phases 4-5: back up `target`, then write and verify.
///
/// The backup status is recorded on `outcome` before writing, so it is
/// available for reporting even when the write is rejected. A symlinked
/// `target` is followed; the link is left in place.
pub fn commit(outcome: &mut MergeOutcome, target: &Path, validator: &dyn Validator) -> Result<()> {
    let target = write::resolve_target(target)?;

    // Phase 4: Backup
    let status = backup::execute(&target)?;
    let status = outcome.backup.insert(status);

    // Phase 5: Write and verify
    write::execute(&outcome.config, &target, status, validator)
}

/// Execute the complete merge operation (Phases 1-5).
pub fn execute_merge(
    paths: &[PathBuf],
    target: &Path,
    validator: &dyn Validator,
) -> Result<MergeOutcome> {
    let mut outcome = prepare(paths)?;
    commit(&mut outcome, target, validator)?;
    Ok(outcome)
}
