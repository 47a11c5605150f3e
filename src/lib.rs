//! # kubemerge Library
//!
//! This library merges Kubernetes client-configuration fragments (kubeconfig
//! files) into a single configuration and safely replaces the user's primary
//! config with the result. It backs the `kubemerge` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use kubemerge::phases::{merge, parse, resolve, Fragment};
//!
//! let a = r#"
//! clusters: [{name: west, cluster: {server: "https://west-a"}}]
//! contexts: [{name: west-ctx, context: {cluster: west}}]
//! current-context: west-ctx
//! "#;
//! let b = r#"
//! clusters: [{name: west, cluster: {server: "https://west-b"}}, {name: east}]
//! "#;
//!
//! let fragments = vec![
//!     Fragment::new("a.yaml", parse::parse_fragment(Path::new("a.yaml"), a.as_bytes()).unwrap()),
//!     Fragment::new("b.yaml", parse::parse_fragment(Path::new("b.yaml"), b.as_bytes()).unwrap()),
//! ];
//!
//! let merged = merge::execute(&fragments);
//! assert_eq!(merged.config.clusters.len(), 2);
//! assert_eq!(merged.config.clusters[0].cluster["server"], "https://west-a");
//! assert_eq!(merged.report.collisions.len(), 1);
//!
//! let current = resolve::execute(&fragments, &merged.config, &merged.report);
//! assert_eq!(current.as_deref(), Some("west-ctx"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Document model (`config`)**: kubeconfig documents with three named
//!   collections whose payloads are carried through untouched.
//! - **Phases (`phases`)**: parse, merge (first name wins), resolve the
//!   current context, back up the target, then write, verify and commit or
//!   roll back.
//! - **Validator (`validator`)**: the external check run on the written file.
//! - **Discovery (`discovery`)** and **summary (`summary`)**: finding the
//!   fragments and reporting what happened.
//!
//! ## Execution Flow
//!
//! `phases::orchestrator::execute_merge` runs:
//!
//! 1.  **Parsing**: Decode each fragment; unparsable ones are skipped.
//! 2.  **Merging**: Fold the fragments in order; later duplicates are dropped
//!     and reported.
//! 3.  **Resolving**: Pick the first usable `current-context`.
//! 4.  **Backup**: Copy the existing target to a timestamped sibling.
//! 5.  **Writing**: Replace the target, verify it, and commit, or restore the
//!     backup if verification fails.

pub mod config;
pub mod discovery;
pub mod error;
pub mod output;
pub mod phases;
pub mod summary;
pub mod validator;

#[cfg(test)]
mod merge_proptest;
