//! Property-based tests for the merge fold and current-context resolution.
//!
//! These tests use proptest to generate fragment sequences and verify that
//! the merge invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::{HashMap, HashSet};

    use crate::config::{KubeConfig, NamedCluster, NamedContext};
    use crate::phases::{merge, resolve, Collection, Fragment};
    use proptest::prelude::*;
    use serde_yaml::Value;

    /// Small name pool so collisions are common.
    fn name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "b", "c", "d", "e"]).prop_map(|s| s.to_string())
    }

    fn fragment(
        index: usize,
        clusters: Vec<(String, u32)>,
        contexts: Vec<String>,
        current: String,
    ) -> Fragment {
        let config = KubeConfig {
            clusters: clusters
                .into_iter()
                .map(|(name, payload)| NamedCluster {
                    name,
                    cluster: Value::from(payload),
                })
                .collect(),
            contexts: contexts
                .into_iter()
                .map(|name| NamedContext {
                    name,
                    context: Value::Null,
                })
                .collect(),
            current_context: current,
            ..KubeConfig::default()
        };
        Fragment::new(format!("f{}.yaml", index), config)
    }

    fn fragments() -> impl Strategy<Value = Vec<Fragment>> {
        let one = (
            prop::collection::vec((name(), any::<u32>()), 0..6),
            prop::collection::vec(name(), 0..4),
            prop_oneof![Just(String::new()), name()],
        );
        prop::collection::vec(one, 1..6).prop_map(|parts| {
            parts
                .into_iter()
                .enumerate()
                .map(|(i, (clusters, contexts, current))| fragment(i, clusters, contexts, current))
                .collect()
        })
    }

    proptest! {
        /// Property: merged collections never contain a name twice
        #[test]
        fn merged_names_are_unique(fragments in fragments()) {
            let merged = merge::execute(&fragments);
            let names: HashSet<_> = merged.config.clusters.iter().map(|c| &c.name).collect();
            prop_assert_eq!(names.len(), merged.config.clusters.len());
            let names: HashSet<_> = merged.config.contexts.iter().map(|c| &c.name).collect();
            prop_assert_eq!(names.len(), merged.config.contexts.len());
        }

        /// Property: each merged entry carries the payload of its first occurrence
        #[test]
        fn first_occurrence_wins(fragments in fragments()) {
            let mut first: HashMap<&str, &Value> = HashMap::new();
            for f in &fragments {
                for c in &f.config.clusters {
                    first.entry(c.name.as_str()).or_insert(&c.cluster);
                }
            }

            let merged = merge::execute(&fragments);
            prop_assert_eq!(merged.config.clusters.len(), first.len());
            for c in &merged.config.clusters {
                prop_assert_eq!(Some(&&c.cluster), first.get(c.name.as_str()));
            }
        }

        /// Property: every input entry is either merged or reported as a collision
        #[test]
        fn entries_are_kept_or_reported(fragments in fragments()) {
            let merged = merge::execute(&fragments);
            let input: usize = fragments.iter().map(|f| f.config.clusters.len()).sum();
            let dropped = merged
                .report
                .collisions
                .iter()
                .filter(|c| c.collection == Collection::Clusters)
                .count();
            prop_assert_eq!(merged.config.clusters.len() + dropped, input);
        }

        /// Property: merging the fragments twice over yields the same document
        #[test]
        fn repeating_input_is_idempotent(fragments in fragments()) {
            let once = merge::execute(&fragments);
            let doubled: Vec<Fragment> = fragments.iter().chain(fragments.iter()).cloned().collect();
            let twice = merge::execute(&doubled);
            prop_assert_eq!(once.config, twice.config);
        }

        /// Property: a resolved current-context always names a merged context
        #[test]
        fn resolved_context_is_present(fragments in fragments()) {
            let merged = merge::execute(&fragments);
            if let Some(current) = resolve::execute(&fragments, &merged.config, &merged.report) {
                prop_assert!(merged.config.has_context(&current));
            }
        }
    }
}
