//! Implementation of the phases of a kubeconfig merge.
//!
//! ## Overview
//!
//! A merge run follows these phases:
//! 1. Parsing - Decode each candidate fragment, skipping the ones that fail
//! 2. Merging - Fold the fragments into one document, first name wins
//! 3. Resolving - Pick the current-context for the merged document
//! 4. Backup - Copy the existing target aside before touching it
//! 5. Writing - Replace the target, verify it, and commit or roll back
//!
//! Phases 1-3 are pure apart from reading fragment files; phases 4-5 are the
//! only ones that touch the target. The orchestrator wires them together.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::KubeConfig;

// Phase modules
pub mod backup;
pub mod merge;
pub mod orchestrator;
pub mod parse;
pub mod resolve;
pub mod write;

pub use backup::BackupStatus;
pub use orchestrator::MergeOutcome;

/// A successfully parsed fragment and where it came from.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub source: PathBuf,
    pub config: KubeConfig,
}

impl Fragment {
    pub fn new(source: impl Into<PathBuf>, config: KubeConfig) -> Self {
        Self {
            source: source.into(),
            config,
        }
    }
}

/// A candidate file excluded from the merge because it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFragment {
    pub path: PathBuf,
    pub reason: String,
}

/// One of the three named collections of a kubeconfig document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Clusters,
    Contexts,
    Users,
}

impl Collection {
    /// Singular noun for messages ("cluster", "context", "user").
    pub fn entry_noun(self) -> &'static str {
        match self {
            Collection::Clusters => "cluster",
            Collection::Contexts => "context",
            Collection::Users => "user",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collection::Clusters => "clusters",
            Collection::Contexts => "contexts",
            Collection::Users => "users",
        };
        f.write_str(name)
    }
}

/// An entry dropped because an earlier fragment already introduced its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub collection: Collection,
    pub name: String,
    /// File the dropped entry came from
    pub source: PathBuf,
    /// Position of that file in the merge order
    #[serde(skip)]
    pub fragment: usize,
}

/// A merged context that points at a cluster or user the merge does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub context: String,
    pub collection: Collection,
    pub missing: String,
}

/// Entry counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub clusters: usize,
    pub contexts: usize,
    pub users: usize,
}

impl Counts {
    pub fn of(config: &KubeConfig) -> Self {
        Self {
            clusters: config.clusters.len(),
            contexts: config.contexts.len(),
            users: config.users.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.clusters + self.contexts + self.users
    }
}

/// What the merge phase did, for the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Entries that made it into the merged document
    pub added: Counts,
    pub collisions: Vec<Collision>,
    pub dangling: Vec<DanglingReference>,
    /// Fragment index that contributed each merged entry
    pub origins: HashMap<(Collection, String), usize>,
}

impl MergeReport {
    /// Whether `name` was dropped from fragment `fragment` in `collection`.
    pub fn was_dropped(&self, collection: Collection, name: &str, fragment: usize) -> bool {
        self.collisions
            .iter()
            .any(|c| c.collection == collection && c.fragment == fragment && c.name == name)
    }

    /// Index of the fragment whose entry for `name` is in the merged document.
    pub fn origin(&self, collection: Collection, name: &str) -> Option<usize> {
        self.origins.get(&(collection, name.to_string())).copied()
    }

    /// Whether fragment `fragment` defined `name` but lost it to another fragment.
    ///
    /// A repeat inside one fragment does not count: its first copy is the
    /// merged entry.
    pub fn was_superseded(&self, collection: Collection, name: &str, fragment: usize) -> bool {
        self.was_dropped(collection, name, fragment)
            && self.origin(collection, name) != Some(fragment)
    }
}
