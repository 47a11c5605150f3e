//! Phase 2: Merging Fragments
//!
//! Folds the parsed fragments, in order, into a single document. Each of the
//! three collections is merged entry by entry with a first-wins policy: the
//! first fragment to introduce a name keeps it, and any later entry with the
//! same name (from another fragment or the same one) is dropped and recorded
//! as a [`Collision`]. Entries are never overwritten.
//!
//! `preferences` keys follow the same first-wins rule but are not reported.
//! The merged `current-context` is left empty here; Phase 3 resolves it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use super::{Collection, Collision, Counts, DanglingReference, Fragment, MergeReport};
use crate::config::{KubeConfig, NamedEntry};

/// The merged document and what it took to build it.
#[derive(Debug, Clone)]
pub struct Merged {
    pub config: KubeConfig,
    pub report: MergeReport,
}

/// Accumulates one collection in first-seen order.
struct CollectionFold<T> {
    collection: Collection,
    entries: Vec<T>,
    /// Merged name -> index of the fragment it came from
    origins: HashMap<String, usize>,
}

impl<T: NamedEntry + Clone> CollectionFold<T> {
    fn new(collection: Collection) -> Self {
        Self {
            collection,
            entries: Vec::new(),
            origins: HashMap::new(),
        }
    }

    /// Fold one fragment's entries in; returns how many were added.
    fn absorb(
        &mut self,
        incoming: &[T],
        source: &Path,
        fragment: usize,
        collisions: &mut Vec<Collision>,
    ) -> usize {
        let mut added = 0;
        for entry in incoming {
            if let Entry::Vacant(slot) = self.origins.entry(entry.name().to_string()) {
                slot.insert(fragment);
                debug!("Adding {}: {}", self.collection.entry_noun(), entry.name());
                self.entries.push(entry.clone());
                added += 1;
            } else {
                warn!(
                    "Skipping duplicate {} '{}' from {}",
                    self.collection.entry_noun(),
                    entry.name(),
                    source.display()
                );
                collisions.push(Collision {
                    collection: self.collection,
                    name: entry.name().to_string(),
                    source: source.to_path_buf(),
                    fragment,
                });
            }
        }
        added
    }

    /// The merged entries; each name's origin is moved into `origins`.
    fn finish(self, origins: &mut HashMap<(Collection, String), usize>) -> Vec<T> {
        let collection = self.collection;
        origins.extend(
            self.origins
                .into_iter()
                .map(|(name, fragment)| ((collection, name), fragment)),
        );
        self.entries
    }
}

/// Execute Phase 2: merge fragments in order.
pub fn execute(fragments: &[Fragment]) -> Merged {
    let mut clusters = CollectionFold::new(Collection::Clusters);
    let mut contexts = CollectionFold::new(Collection::Contexts);
    let mut users = CollectionFold::new(Collection::Users);
    let mut collisions = Vec::new();
    let mut merged = KubeConfig::default();

    for (index, fragment) in fragments.iter().enumerate() {
        let source = fragment.source.as_path();
        let config = &fragment.config;

        let added = clusters.absorb(&config.clusters, source, index, &mut collisions)
            + contexts.absorb(&config.contexts, source, index, &mut collisions)
            + users.absorb(&config.users, source, index, &mut collisions);

        for (key, value) in &config.preferences {
            if !merged.preferences.contains_key(key) {
                merged.preferences.insert(key.clone(), value.clone());
            }
        }

        if added > 0 {
            info!("Added {} entries from {}", added, source.display());
        } else {
            debug!("No new entries from {}", source.display());
        }
    }

    let mut origins = HashMap::new();
    merged.clusters = clusters.finish(&mut origins);
    merged.contexts = contexts.finish(&mut origins);
    merged.users = users.finish(&mut origins);

    let dangling = find_dangling(&merged);
    for reference in &dangling {
        warn!(
            "Context '{}' references missing {} '{}'",
            reference.context,
            reference.collection.entry_noun(),
            reference.missing
        );
    }

    Merged {
        report: MergeReport {
            added: Counts::of(&merged),
            collisions,
            dangling,
            origins,
        },
        config: merged,
    }
}

/// Contexts whose `cluster` or `user` names no entry in the document.
pub fn find_dangling(config: &KubeConfig) -> Vec<DanglingReference> {
    let mut dangling = Vec::new();
    for context in &config.contexts {
        if let Some(cluster) = context.cluster_ref() {
            if !config.has_cluster(cluster) {
                dangling.push(DanglingReference {
                    context: context.name.clone(),
                    collection: Collection::Clusters,
                    missing: cluster.to_string(),
                });
            }
        }
        if let Some(user) = context.user_ref() {
            if !config.has_user(user) {
                dangling.push(DanglingReference {
                    context: context.name.clone(),
                    collection: Collection::Users,
                    missing: user.to_string(),
                });
            }
        }
    }
    dangling
}
