//! Phase 3: Resolving the Current Context
//!
//! Each fragment may name its own `current-context`. The merged document
//! takes the first non-empty one, in merge order, that is usable:
//!
//! - the name must be present in the merged `contexts`, and
//! - if the fragment defines that context itself, the merged entry must be
//!   the fragment's own; a definition it lost to an earlier fragment means
//!   the merged context is not the one it meant. A name repeated inside the
//!   fragment still resolves to its first copy.
//!
//! Unusable candidates are skipped rather than treated as errors. When no
//! candidate is usable the merged document has no current context.

use log::{debug, info};

use super::{Collection, Fragment, MergeReport};
use crate::config::KubeConfig;

/// Execute Phase 3: pick the current-context for `merged`.
pub fn execute(fragments: &[Fragment], merged: &KubeConfig, report: &MergeReport) -> Option<String> {
    for (index, fragment) in fragments.iter().enumerate() {
        let candidate = fragment.config.current_context.as_str();
        if candidate.is_empty() {
            continue;
        }

        if !merged.has_context(candidate) {
            debug!(
                "Ignoring current-context '{}' from {}: not in merged contexts",
                candidate,
                fragment.source.display()
            );
            continue;
        }

        if report.was_superseded(Collection::Contexts, candidate, index) {
            debug!(
                "Ignoring current-context '{}' from {}: its context was superseded",
                candidate,
                fragment.source.display()
            );
            continue;
        }

        info!(
            "Using current-context '{}' from {}",
            candidate,
            fragment.source.display()
        );
        return Some(candidate.to_string());
    }

    None
}
